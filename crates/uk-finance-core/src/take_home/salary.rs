use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::bands::schedules::{
    income_tax_schedule, national_insurance_schedule, personal_allowance, student_loan_schedule,
    StudentLoanPlan, TaxRegion,
};
use crate::bands::BandBreakdown;
use crate::contributions::{annual_contribution, ContributionDeclaration, QualifyingEarningsBand};
use crate::error::UkFinanceError;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::UkFinanceResult;

/// Basic-rate relief added by the provider under relief at source.
const RELIEF_AT_SOURCE_RATE: Decimal = dec!(0.20);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How an employee pension contribution is taken from pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PensionMethod {
    /// Deducted before income tax, after NI.
    NetPay,
    /// Paid from taxed pay; the provider claims 20% relief on top.
    ReliefAtSource,
    /// Exchanged for salary; reduces pay for both income tax and NI.
    SalarySacrifice,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PensionDeduction {
    /// Gross contribution reaching the pension.
    pub declaration: ContributionDeclaration,
    pub method: PensionMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifying_earnings: Option<QualifyingEarningsBand>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakeHomeInput {
    pub gross_salary: Money,
    #[serde(default)]
    pub region: TaxRegion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pension: Option<PensionDeduction>,
    #[serde(default)]
    pub student_loans: Vec<StudentLoanPlan>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentLoanRepayment {
    pub plan: StudentLoanPlan,
    pub repayment: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakeHomeOutput {
    pub gross_salary: Money,
    /// Amount reaching the pension pot.
    pub pension_contribution: Money,
    /// What the contribution costs out of pay.
    pub pension_cost_to_employee: Money,
    pub taxable_income: Money,
    pub personal_allowance: Money,
    pub income_tax: Money,
    pub national_insurance: Money,
    pub student_loan_repayments: Vec<StudentLoanRepayment>,
    pub total_deductions: Money,
    pub take_home_annual: Money,
    pub take_home_monthly: Money,
    pub income_tax_breakdown: BandBreakdown,
    pub national_insurance_breakdown: BandBreakdown,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Annual take-home pay after pension, income tax, NI and student loans.
pub fn calculate_take_home(
    input: &TakeHomeInput,
) -> UkFinanceResult<ComputationOutput<TakeHomeOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.gross_salary < Decimal::ZERO {
        return Err(UkFinanceError::InvalidInput {
            field: "gross_salary".into(),
            reason: "gross_salary must be non-negative".into(),
        });
    }
    let gross = input.gross_salary;

    let (contribution, method) = match &input.pension {
        Some(p) => (
            annual_contribution(gross, &p.declaration, p.qualifying_earnings.as_ref())?,
            Some(p.method),
        ),
        None => (Decimal::ZERO, None),
    };

    if contribution > gross {
        return Err(UkFinanceError::InvalidInput {
            field: "pension".into(),
            reason: format!("contribution {contribution} exceeds gross salary {gross}"),
        });
    }

    // Pay subject to NI and student loans, pay subject to income tax, and
    // the cost of the contribution to the employee.
    let (ni_pay, taxable_income, pension_cost) = match method {
        Some(PensionMethod::SalarySacrifice) => (gross - contribution, gross - contribution, Decimal::ZERO),
        Some(PensionMethod::NetPay) => (gross, gross - contribution, contribution),
        Some(PensionMethod::ReliefAtSource) => (
            gross,
            gross,
            contribution * (Decimal::ONE - RELIEF_AT_SOURCE_RATE),
        ),
        None => (gross, gross, Decimal::ZERO),
    };

    let income_tax_breakdown =
        income_tax_schedule(taxable_income, input.region)?.apply(taxable_income);
    let national_insurance_breakdown = national_insurance_schedule()?.apply(ni_pay);

    let mut student_loan_repayments = Vec::with_capacity(input.student_loans.len());
    for plan in &input.student_loans {
        let repayment = student_loan_schedule(*plan)?.apply(ni_pay).total_tax.floor();
        student_loan_repayments.push(StudentLoanRepayment {
            plan: *plan,
            repayment,
        });
    }
    if input
        .student_loans
        .iter()
        .filter(|p| **p != StudentLoanPlan::Postgraduate)
        .count()
        > 1
    {
        warnings.push(
            "Only the undergraduate plan with the lowest threshold is normally repaid at a time"
                .into(),
        );
    }

    let income_tax = income_tax_breakdown.total_tax;
    let national_insurance = national_insurance_breakdown.total_tax;
    let student_loan_total: Money = student_loan_repayments.iter().map(|r| r.repayment).sum();
    let sacrificed = gross - ni_pay;
    let total_deductions =
        sacrificed + pension_cost + income_tax + national_insurance + student_loan_total;
    let take_home_annual = gross - total_deductions;

    debug!(
        "take-home for gross {}: tax {}, NI {}, net {}",
        gross, income_tax, national_insurance, take_home_annual
    );

    let output = TakeHomeOutput {
        gross_salary: gross,
        pension_contribution: contribution,
        pension_cost_to_employee: pension_cost + sacrificed,
        taxable_income,
        personal_allowance: personal_allowance(taxable_income),
        income_tax,
        national_insurance,
        student_loan_repayments,
        total_deductions,
        take_home_annual,
        take_home_monthly: take_home_annual / dec!(12),
        income_tax_breakdown,
        national_insurance_breakdown,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Annual take-home pay (2025/26 income tax, Class 1 NI, student loan bands)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn input(gross: Money) -> TakeHomeInput {
        TakeHomeInput {
            gross_salary: gross,
            region: TaxRegion::RestOfUk,
            pension: None,
            student_loans: vec![],
        }
    }

    fn with_pension(gross: Money, method: PensionMethod) -> TakeHomeInput {
        TakeHomeInput {
            pension: Some(PensionDeduction {
                declaration: ContributionDeclaration::percentage_of_total(dec!(5)),
                method,
                qualifying_earnings: None,
            }),
            ..input(gross)
        }
    }

    fn run(input: &TakeHomeInput) -> TakeHomeOutput {
        calculate_take_home(input).unwrap().result
    }

    #[test]
    fn test_basic_rate_take_home() {
        let out = run(&input(dec!(35_000)));
        assert_eq!(out.income_tax, dec!(4_486));
        assert_eq!(out.national_insurance, dec!(1_794.40));
        assert_eq!(out.take_home_annual, dec!(28_719.60));
        assert_eq!(out.take_home_monthly, dec!(2_393.30));
    }

    #[test]
    fn test_salary_sacrifice_saves_ni() {
        let out = run(&with_pension(dec!(35_000), PensionMethod::SalarySacrifice));
        // 1,750 sacrificed; both tax and NI fall
        assert_eq!(out.taxable_income, dec!(33_250));
        assert_eq!(out.income_tax, dec!(4_136));
        assert_eq!(out.national_insurance, dec!(1_654.40));
        assert_eq!(out.pension_cost_to_employee, dec!(1_750));
        assert_eq!(out.take_home_annual, dec!(27_459.60));
    }

    #[test]
    fn test_net_pay_saves_tax_only() {
        let out = run(&with_pension(dec!(35_000), PensionMethod::NetPay));
        assert_eq!(out.income_tax, dec!(4_136));
        assert_eq!(out.national_insurance, dec!(1_794.40));
        assert_eq!(out.take_home_annual, dec!(27_319.60));
    }

    #[test]
    fn test_relief_at_source_costs_eighty_percent() {
        let out = run(&with_pension(dec!(35_000), PensionMethod::ReliefAtSource));
        assert_eq!(out.pension_contribution, dec!(1_750));
        assert_eq!(out.pension_cost_to_employee, dec!(1_400));
        assert_eq!(out.take_home_annual, dec!(27_319.60));
    }

    #[test]
    fn test_student_loan_deducted() {
        let mut inp = input(dec!(38_470));
        inp.student_loans = vec![StudentLoanPlan::Plan2];
        let out = run(&inp);
        assert_eq!(out.student_loan_repayments[0].repayment, dec!(900));
    }

    #[test]
    fn test_allowance_tapered_for_high_earner() {
        let out = run(&input(dec!(110_000)));
        assert_eq!(out.personal_allowance, dec!(7_570));
        // 37,700 at 20% + (110,000 - 45,270) at 40%
        assert_eq!(out.income_tax, dec!(33_432));
    }

    #[test]
    fn test_contribution_above_salary_rejected() {
        let mut inp = input(dec!(10_000));
        inp.pension = Some(PensionDeduction {
            declaration: ContributionDeclaration::fixed(
                dec!(1_000),
                crate::contributions::Frequency::Monthly,
            ),
            method: PensionMethod::NetPay,
            qualifying_earnings: None,
        });
        assert!(calculate_take_home(&inp).is_err());
    }
}
