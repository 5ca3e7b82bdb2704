use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use uk_finance_core::bands::schedules::{StudentLoanPlan, TaxRegion};
use uk_finance_core::contributions::ContributionDeclaration;
use uk_finance_core::take_home::salary::{self, PensionDeduction, PensionMethod, TakeHomeInput};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TaxRegionArg {
    RestOfUk,
    Scotland,
}

impl From<TaxRegionArg> for TaxRegion {
    fn from(r: TaxRegionArg) -> Self {
        match r {
            TaxRegionArg::RestOfUk => TaxRegion::RestOfUk,
            TaxRegionArg::Scotland => TaxRegion::Scotland,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PensionMethodArg {
    NetPay,
    ReliefAtSource,
    SalarySacrifice,
}

impl From<PensionMethodArg> for PensionMethod {
    fn from(m: PensionMethodArg) -> Self {
        match m {
            PensionMethodArg::NetPay => PensionMethod::NetPay,
            PensionMethodArg::ReliefAtSource => PensionMethod::ReliefAtSource,
            PensionMethodArg::SalarySacrifice => PensionMethod::SalarySacrifice,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StudentLoanArg {
    Plan1,
    Plan2,
    Plan4,
    Plan5,
    Postgraduate,
}

impl From<StudentLoanArg> for StudentLoanPlan {
    fn from(p: StudentLoanArg) -> Self {
        match p {
            StudentLoanArg::Plan1 => StudentLoanPlan::Plan1,
            StudentLoanArg::Plan2 => StudentLoanPlan::Plan2,
            StudentLoanArg::Plan4 => StudentLoanPlan::Plan4,
            StudentLoanArg::Plan5 => StudentLoanPlan::Plan5,
            StudentLoanArg::Postgraduate => StudentLoanPlan::Postgraduate,
        }
    }
}

/// Arguments for annual take-home pay
#[derive(Args)]
pub struct TakeHomeArgs {
    /// Gross annual salary
    #[arg(long)]
    pub salary: Option<Decimal>,

    /// Income tax jurisdiction
    #[arg(long, value_enum, default_value = "rest-of-uk")]
    pub region: TaxRegionArg,

    /// Employee pension contribution as a percentage of salary
    #[arg(long)]
    pub pension_pct: Option<Decimal>,

    /// How the pension contribution is taken from pay
    #[arg(long, value_enum, default_value = "net-pay")]
    pub pension_method: PensionMethodArg,

    /// Student loan plan (repeatable)
    #[arg(long, value_enum)]
    pub student_loan: Vec<StudentLoanArg>,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_take_home(args: TakeHomeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let th_input: TakeHomeInput = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => TakeHomeInput {
            gross_salary: args
                .salary
                .ok_or("--salary is required (or provide --input)")?,
            region: args.region.into(),
            pension: args.pension_pct.map(|pct| PensionDeduction {
                declaration: ContributionDeclaration::percentage_of_total(pct),
                method: args.pension_method.into(),
                qualifying_earnings: None,
            }),
            student_loans: args.student_loan.into_iter().map(Into::into).collect(),
        },
    };

    let result = salary::calculate_take_home(&th_input)?;
    Ok(serde_json::to_value(result)?)
}
