use log::{debug, trace};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::contributions::{annual_contribution, ContributionDeclaration, QualifyingEarningsBand};
use crate::error::UkFinanceError;
use crate::time_value::{compound, deflate};
use crate::types::{percent_to_rate, with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::UkFinanceResult;

/// UK lump sum allowance: cap on the 25% tax-free pension commencement lump sum.
pub const LUMP_SUM_ALLOWANCE: Money = dec!(268_275);

const TAX_FREE_FRACTION: Decimal = dec!(0.25);
const DEFAULT_DRAWDOWN_RATE: Percent = dec!(4);
const ALLOCATION_TOLERANCE: Decimal = dec!(0.01);
/// Oldest accepted retirement age.
pub const MAX_AGE: u32 = 125;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// The saver's circumstances and economic assumptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub current_age: u32,
    pub retirement_age: u32,
    pub current_salary: Money,
    pub current_pension_value: Money,
    pub employee_contribution: ContributionDeclaration,
    pub employer_contribution: ContributionDeclaration,
    /// Required when either declaration uses the qualifying earnings basis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifying_earnings: Option<QualifyingEarningsBand>,
    /// Annual salary growth, in percent.
    pub salary_growth_rate: Percent,
    /// Annual inflation used to deflate into today's money, in percent.
    pub inflation_rate: Percent,
}

/// Portfolio weights in percent. Must sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetAllocation {
    pub stocks: Percent,
    pub bonds: Percent,
    pub cash: Percent,
}

/// Expected annual return per asset class, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetReturns {
    pub stocks: Percent,
    pub bonds: Percent,
    pub cash: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PensionProjectionInput {
    pub personal_info: PersonalInfo,
    pub allocation: AssetAllocation,
    pub returns: AssetReturns,
    /// Overrides the allocation-weighted return when present, in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_return: Option<Percent>,
    /// Sustainable withdrawal rate for the retirement income estimate, in
    /// percent. Defaults to 4.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drawdown_rate: Option<Percent>,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetBreakdown {
    pub stocks: Money,
    pub bonds: Money,
    pub cash: Money,
}

/// Pot value at the end of one simulated year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionYearSnapshot {
    pub age: u32,
    pub salary: Money,
    pub employee_contribution: Money,
    pub employer_contribution: Money,
    pub investment_growth: Money,
    pub nominal_total_value: Money,
    /// Nominal value deflated to today's money.
    pub real_total_value: Money,
    pub cumulative_user_contribution: Money,
    pub cumulative_employer_contribution: Money,
    pub cumulative_growth: Money,
    pub asset_breakdown: AssetBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PensionSummary {
    pub retirement_age: u32,
    pub years_projected: u32,
    pub weighted_return: Rate,
    pub nominal_value_at_retirement: Money,
    pub real_value_at_retirement: Money,
    pub total_user_contribution: Money,
    pub total_employer_contribution: Money,
    pub total_contributions: Money,
    pub total_growth: Money,
    pub tax_free_lump_sum: Money,
    pub estimated_annual_income: Money,
    pub estimated_annual_income_real: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PensionProjection {
    pub years: Vec<ProjectionYearSnapshot>,
    pub summary: PensionSummary,
}

// ---------------------------------------------------------------------------
// Simulation state
// ---------------------------------------------------------------------------

/// Mutable accumulator for one projection run.
#[derive(Debug, Clone)]
struct PensionState {
    age: u32,
    nominal_balance: Money,
    cumulative_user_contribution: Money,
    cumulative_employer_contribution: Money,
    cumulative_growth: Money,
    salary: Money,
}

impl PensionState {
    fn new(info: &PersonalInfo) -> Self {
        PensionState {
            age: info.current_age,
            nominal_balance: info.current_pension_value,
            cumulative_user_contribution: Decimal::ZERO,
            cumulative_employer_contribution: Decimal::ZERO,
            cumulative_growth: Decimal::ZERO,
            salary: info.current_salary,
        }
    }
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Project a defined-contribution pot year by year from current age to
/// retirement age inclusive.
///
/// Each year contributions are resolved against that year's salary, the pot
/// grows by the weighted return, and only then does salary grow. Year 0
/// (current age) is not deflated, so its real and nominal values match.
pub fn project_pension(
    input: &PensionProjectionInput,
) -> UkFinanceResult<ComputationOutput<PensionProjection>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let info = &input.personal_info;
    let years_to_retirement = info.retirement_age - info.current_age;
    let weighted_return = weighted_return(input)?;
    let salary_growth = percent_to_rate(info.salary_growth_rate);
    let inflation = percent_to_rate(info.inflation_rate);
    let band = info.qualifying_earnings.as_ref();

    if input.allocation.cash > Decimal::ZERO && input.returns.cash.is_zero() {
        warnings.push("Cash allocation is assumed to earn 0%".into());
    }
    if weighted_return < inflation {
        warnings.push(format!(
            "Expected return {weighted_return} is below inflation {inflation}; the pot loses value in real terms"
        ));
    }

    debug!(
        "projecting pension from age {} to {} at weighted return {}",
        info.current_age, info.retirement_age, weighted_return
    );

    let mut state = PensionState::new(info);
    let mut years = Vec::with_capacity(years_to_retirement as usize + 1);

    for year in 0..=years_to_retirement {
        let employee = annual_contribution(state.salary, &info.employee_contribution, band)?;
        let employer = annual_contribution(state.salary, &info.employer_contribution, band)?;
        let contributed = state
            .nominal_balance
            .checked_add(employee)
            .and_then(|v| v.checked_add(employer))
            .ok_or_else(|| out_of_range("pension balance"))?;

        let end_balance = contributed
            .checked_mul(Decimal::ONE + weighted_return)
            .ok_or_else(|| out_of_range("pension balance"))?
            .max(Decimal::ZERO);
        let growth = end_balance - contributed;

        state.nominal_balance = end_balance;
        state.cumulative_user_contribution = state
            .cumulative_user_contribution
            .checked_add(employee)
            .ok_or_else(|| out_of_range("employee contributions"))?;
        state.cumulative_employer_contribution = state
            .cumulative_employer_contribution
            .checked_add(employer)
            .ok_or_else(|| out_of_range("employer contributions"))?;
        state.cumulative_growth = state
            .cumulative_growth
            .checked_add(growth)
            .ok_or_else(|| out_of_range("investment growth"))?;

        let snapshot = ProjectionYearSnapshot {
            age: state.age,
            salary: state.salary,
            employee_contribution: employee,
            employer_contribution: employer,
            investment_growth: growth,
            nominal_total_value: end_balance,
            real_total_value: deflate(end_balance, inflation, year)?,
            cumulative_user_contribution: state.cumulative_user_contribution,
            cumulative_employer_contribution: state.cumulative_employer_contribution,
            cumulative_growth: state.cumulative_growth,
            asset_breakdown: breakdown(end_balance, &input.allocation),
        };
        trace!(
            "age {}: balance {} (growth {})",
            snapshot.age,
            snapshot.nominal_total_value,
            growth
        );
        years.push(snapshot);

        state.salary = state
            .salary
            .checked_mul(Decimal::ONE + salary_growth)
            .ok_or_else(|| out_of_range("salary"))?;
        state.age += 1;
    }

    let summary = summarise(input, &years, weighted_return, years_to_retirement)?;
    debug!(
        "pension projection complete: {} at retirement ({} real)",
        summary.nominal_value_at_retirement, summary.real_value_at_retirement
    );

    let output = PensionProjection { years, summary };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Defined contribution pension projection (annual compounding, allocation-weighted return)",
        &serde_json::json!({
            "current_age": info.current_age,
            "retirement_age": info.retirement_age,
            "weighted_return": weighted_return.to_string(),
            "salary_growth_rate": salary_growth.to_string(),
            "inflation_rate": inflation.to_string(),
            "return_override": input.expected_return.is_some(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Annual return as a decimal: the explicit override if given, otherwise
/// the allocation-weighted average of per-class returns.
pub fn weighted_return(input: &PensionProjectionInput) -> UkFinanceResult<Rate> {
    if let Some(pct) = input.expected_return {
        return Ok(percent_to_rate(pct));
    }
    let a = &input.allocation;
    let r = &input.returns;
    let weighted_pct = percent_to_rate(a.stocks)
        .checked_mul(r.stocks)
        .zip(percent_to_rate(a.bonds).checked_mul(r.bonds))
        .zip(percent_to_rate(a.cash).checked_mul(r.cash))
        .and_then(|((stocks, bonds), cash)| stocks.checked_add(bonds)?.checked_add(cash))
        .ok_or_else(|| UkFinanceError::InvalidRate {
            field: "returns".into(),
            reason: "weighted return is out of range".into(),
        })?;
    Ok(percent_to_rate(weighted_pct))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn breakdown(balance: Money, allocation: &AssetAllocation) -> AssetBreakdown {
    AssetBreakdown {
        stocks: balance * percent_to_rate(allocation.stocks),
        bonds: balance * percent_to_rate(allocation.bonds),
        cash: balance * percent_to_rate(allocation.cash),
    }
}

fn out_of_range(what: &str) -> UkFinanceError {
    UkFinanceError::InvalidInput {
        field: "personal_info".into(),
        reason: format!("projected {what} exceeds the representable range"),
    }
}

fn summarise(
    input: &PensionProjectionInput,
    years: &[ProjectionYearSnapshot],
    weighted_return: Rate,
    years_to_retirement: u32,
) -> UkFinanceResult<PensionSummary> {
    // years always holds at least the year-0 snapshot.
    let (nominal, real, user, employer, growth) = years
        .last()
        .map(|s| {
            (
                s.nominal_total_value,
                s.real_total_value,
                s.cumulative_user_contribution,
                s.cumulative_employer_contribution,
                s.cumulative_growth,
            )
        })
        .unwrap_or_default();

    let drawdown = percent_to_rate(input.drawdown_rate.unwrap_or(DEFAULT_DRAWDOWN_RATE));
    let tax_free_lump_sum = (nominal * TAX_FREE_FRACTION).min(LUMP_SUM_ALLOWANCE);

    let total_contributions = user
        .checked_add(employer)
        .ok_or_else(|| out_of_range("total contributions"))?;

    Ok(PensionSummary {
        retirement_age: input.personal_info.retirement_age,
        years_projected: years_to_retirement,
        weighted_return,
        nominal_value_at_retirement: nominal,
        real_value_at_retirement: real,
        total_user_contribution: user,
        total_employer_contribution: employer,
        total_contributions,
        total_growth: growth,
        tax_free_lump_sum,
        estimated_annual_income: (nominal - tax_free_lump_sum) * drawdown,
        estimated_annual_income_real: (real - tax_free_lump_sum.min(real)) * drawdown,
    })
}

fn validate_input(input: &PensionProjectionInput) -> UkFinanceResult<()> {
    let info = &input.personal_info;

    if info.retirement_age <= info.current_age {
        return Err(UkFinanceError::InvalidRange {
            field: "retirement_age".into(),
            reason: format!(
                "retirement_age ({}) must be greater than current_age ({})",
                info.retirement_age, info.current_age
            ),
        });
    }
    if info.retirement_age > MAX_AGE {
        return Err(UkFinanceError::InvalidRange {
            field: "retirement_age".into(),
            reason: format!("retirement_age must not exceed {MAX_AGE}"),
        });
    }
    if info.current_salary < Decimal::ZERO {
        return Err(UkFinanceError::InvalidInput {
            field: "current_salary".into(),
            reason: "current_salary must be non-negative".into(),
        });
    }
    if info.current_pension_value < Decimal::ZERO {
        return Err(UkFinanceError::InvalidInput {
            field: "current_pension_value".into(),
            reason: "current_pension_value must be non-negative".into(),
        });
    }
    for (field, pct) in [
        ("salary_growth_rate", info.salary_growth_rate),
        ("inflation_rate", info.inflation_rate),
    ] {
        if pct <= dec!(-100) {
            return Err(UkFinanceError::InvalidRate {
                field: field.into(),
                reason: "rate must be greater than -100%".into(),
            });
        }
    }
    if let Some(pct) = input.expected_return {
        if pct <= dec!(-100) {
            return Err(UkFinanceError::InvalidRate {
                field: "expected_return".into(),
                reason: "rate must be greater than -100%".into(),
            });
        }
    }
    for (class, pct) in [
        ("stocks", input.returns.stocks),
        ("bonds", input.returns.bonds),
        ("cash", input.returns.cash),
    ] {
        if pct <= dec!(-100) {
            return Err(UkFinanceError::InvalidRate {
                field: format!("returns.{class}"),
                reason: "rate must be greater than -100%".into(),
            });
        }
    }
    if let Some(pct) = input.drawdown_rate {
        if pct < Decimal::ZERO || pct > dec!(100) {
            return Err(UkFinanceError::InvalidRate {
                field: "drawdown_rate".into(),
                reason: "drawdown_rate must be between 0 and 100".into(),
            });
        }
    }

    validate_allocation(&input.allocation)?;

    // Declarations must resolve before the first simulated year.
    let band = info.qualifying_earnings.as_ref();
    annual_contribution(info.current_salary, &info.employee_contribution, band)?;
    annual_contribution(info.current_salary, &info.employer_contribution, band)?;

    check_compounding(input)
}

/// Return, salary growth and inflation compounded over the whole projection
/// must stay within Decimal's range, and so must every balance the yearly
/// loop can reach.
fn check_compounding(input: &PensionProjectionInput) -> UkFinanceResult<()> {
    let info = &input.personal_info;
    let span = info.retirement_age - info.current_age;
    let too_high = |field: &str, pct: Percent| UkFinanceError::InvalidRate {
        field: field.into(),
        reason: format!("{pct}% cannot be compounded over {span} years"),
    };

    let return_field = if input.expected_return.is_some() {
        "expected_return"
    } else {
        "returns"
    };
    let annual_return = weighted_return(input)?;
    let return_pct = annual_return * dec!(100);
    let growth = compound(annual_return, span + 1).map_err(|_| too_high(return_field, return_pct))?;
    let salary_factor = compound(percent_to_rate(info.salary_growth_rate), span + 1)
        .map_err(|_| too_high("salary_growth_rate", info.salary_growth_rate))?;
    let inflation_factor = compound(percent_to_rate(info.inflation_rate), span)
        .map_err(|_| too_high("inflation_rate", info.inflation_rate))?;

    let peak_salary = info
        .current_salary
        .checked_mul(salary_factor.max(Decimal::ONE))
        .ok_or_else(|| UkFinanceError::InvalidInput {
            field: "current_salary".into(),
            reason: format!("salary cannot be grown over {span} years"),
        })?;

    // Contributions are monotone in salary, so the pot plus every year's
    // contribution at the peak salary, grown over the full span, bounds
    // every nominal balance.
    let band = info.qualifying_earnings.as_ref();
    let peak_nominal = annual_contribution(peak_salary, &info.employee_contribution, band)?
        .checked_add(annual_contribution(peak_salary, &info.employer_contribution, band)?)
        .and_then(|c| c.checked_mul(Decimal::from(span + 1)))
        .and_then(|c| c.checked_add(info.current_pension_value))
        .and_then(|v| v.checked_mul(growth.max(Decimal::ONE)))
        .ok_or_else(|| too_high(return_field, return_pct))?;

    // Deflation divides by at most the smallest inflation factor.
    let smallest_deflator = inflation_factor.min(Decimal::ONE);
    peak_nominal
        .checked_div(smallest_deflator)
        .ok_or_else(|| too_high("inflation_rate", info.inflation_rate))?;
    Ok(())
}

/// Weights must each lie in [0, 100] and sum to 100.
pub fn validate_allocation(allocation: &AssetAllocation) -> UkFinanceResult<()> {
    for (class, weight) in [
        ("stocks", allocation.stocks),
        ("bonds", allocation.bonds),
        ("cash", allocation.cash),
    ] {
        if weight < Decimal::ZERO || weight > dec!(100) {
            return Err(UkFinanceError::InvalidAllocation(format!(
                "{class} weight {weight} must be between 0 and 100"
            )));
        }
    }
    let total = allocation.stocks + allocation.bonds + allocation.cash;
    if (total - dec!(100)).abs() > ALLOCATION_TOLERANCE {
        return Err(UkFinanceError::InvalidAllocation(format!(
            "weights sum to {total}, expected 100"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
