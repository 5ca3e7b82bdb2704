use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use uk_finance_core::contributions::{ContributionDeclaration, QualifyingEarningsBand};
use uk_finance_core::pension::projection::{
    self, AssetAllocation, AssetReturns, PensionProjectionInput, PersonalInfo,
};

use crate::input;

/// Arguments for a pension pot projection
#[derive(Args)]
pub struct PensionProjectionArgs {
    /// Age today
    #[arg(long)]
    pub current_age: Option<u32>,

    /// Age at which contributions stop
    #[arg(long, default_value = "68")]
    pub retirement_age: u32,

    /// Gross annual salary
    #[arg(long)]
    pub salary: Option<Decimal>,

    /// Current pension pot value
    #[arg(long, default_value = "0")]
    pub pot: Decimal,

    /// Employee contribution as a percentage of salary (e.g. 5 for 5%)
    #[arg(long, default_value = "5")]
    pub employee_pct: Decimal,

    /// Employer contribution as a percentage of salary
    #[arg(long, default_value = "3")]
    pub employer_pct: Decimal,

    /// Apply both percentages to auto-enrolment qualifying earnings only
    #[arg(long)]
    pub qualifying_earnings: bool,

    /// Annual salary growth in percent
    #[arg(long, default_value = "2")]
    pub salary_growth: Decimal,

    /// Annual inflation in percent
    #[arg(long, default_value = "2")]
    pub inflation: Decimal,

    /// Percent of the pot in stocks
    #[arg(long, default_value = "80")]
    pub stocks: Decimal,

    /// Percent of the pot in bonds
    #[arg(long, default_value = "15")]
    pub bonds: Decimal,

    /// Percent of the pot in cash
    #[arg(long, default_value = "5")]
    pub cash: Decimal,

    /// Expected annual return in percent (overrides the allocation-weighted return)
    #[arg(long)]
    pub expected_return: Option<Decimal>,

    /// Sustainable drawdown rate in percent used for the income estimate
    #[arg(long)]
    pub drawdown_rate: Option<Decimal>,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_pension_projection(
    args: PensionProjectionArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let pension_input: PensionProjectionInput = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => {
            let (employee, employer, band) = if args.qualifying_earnings {
                (
                    ContributionDeclaration::percentage_of_qualifying(args.employee_pct),
                    ContributionDeclaration::percentage_of_qualifying(args.employer_pct),
                    Some(QualifyingEarningsBand::AUTO_ENROLMENT),
                )
            } else {
                (
                    ContributionDeclaration::percentage_of_total(args.employee_pct),
                    ContributionDeclaration::percentage_of_total(args.employer_pct),
                    None,
                )
            };
            PensionProjectionInput {
                personal_info: PersonalInfo {
                    current_age: args
                        .current_age
                        .ok_or("--current-age is required (or provide --input)")?,
                    retirement_age: args.retirement_age,
                    current_salary: args
                        .salary
                        .ok_or("--salary is required (or provide --input)")?,
                    current_pension_value: args.pot,
                    employee_contribution: employee,
                    employer_contribution: employer,
                    qualifying_earnings: band,
                    salary_growth_rate: args.salary_growth,
                    inflation_rate: args.inflation,
                },
                allocation: AssetAllocation {
                    stocks: args.stocks,
                    bonds: args.bonds,
                    cash: args.cash,
                },
                returns: AssetReturns {
                    stocks: dec!(7),
                    bonds: dec!(3),
                    cash: dec!(1),
                },
                expected_return: args.expected_return,
                drawdown_rate: args.drawdown_rate,
            }
        }
    };

    let result = projection::project_pension(&pension_input)?;
    Ok(serde_json::to_value(result)?)
}
