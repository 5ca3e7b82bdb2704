use log::{debug, trace};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::schedule::{term_months, AmortizationMonth, LoanSchedule, LoanTerms, INTERNAL_DP};
use crate::error::UkFinanceError;
use crate::time_value::level_payment;
use crate::types::{percent_to_rate, with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::UkFinanceResult;

/// Shift applied for the higher/lower rate payment comparison, in percent.
const SENSITIVITY_SHIFT: Percent = dec!(1);

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Position at the end of one loan year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationYearSnapshot {
    pub year: u32,
    pub cumulative_principal_paid: Money,
    pub cumulative_interest_paid: Money,
    pub remaining_balance: Money,
    pub yearly_principal_paid: Money,
    pub yearly_interest_paid: Money,
    /// Interest still to pay if the remaining balance were re-financed today
    /// at the same rate over the remaining term.
    pub projected_remaining_interest: Money,
    pub projected_remaining_principal: Money,
}

/// Level payments at the contract rate shifted up and down by one point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSensitivity {
    pub higher_rate: Percent,
    pub higher_rate_payment: Money,
    pub lower_rate: Percent,
    pub lower_rate_payment: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSummary {
    /// Contractual payment excluding overpayment.
    pub monthly_payment: Money,
    /// Contractual payment plus overpayment.
    pub total_monthly_payment: Money,
    pub total_interest: Money,
    pub total_paid: Money,
    pub original_term_months: u32,
    pub actual_months: u32,
    pub months_reduced: u32,
    pub paid_off_early: bool,
    pub payoff_years: u32,
    pub payoff_months: u32,
    pub interest_without_overpayment: Money,
    pub interest_saved: Money,
    /// Balance still owed after the last simulated month (non-zero only for
    /// interest-only loans).
    pub balance_at_term_end: Money,
    pub sensitivity: RateSensitivity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationResult {
    /// Exactly `term_years` entries; years after payoff are zero-flow rows.
    pub yearly_snapshots: Vec<AmortizationYearSnapshot>,
    pub summary: AmortizationSummary,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Simulate a repayment or interest-only mortgage month by month, roll the
/// months up into loan years, and compare against the same loan without
/// overpayment.
pub fn simulate_amortization(
    terms: &LoanTerms,
) -> UkFinanceResult<ComputationOutput<AmortizationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let schedule = LoanSchedule::new(terms)?;
    debug!(
        "simulating {} month loan of {} at {}% (overpayment {}, interest only {})",
        schedule.term_months(),
        terms.principal,
        terms.annual_rate,
        terms.monthly_overpayment,
        terms.interest_only
    );

    let (yearly_snapshots, last) = roll_up_years(&schedule, terms.term_years);

    let (actual_months, total_interest, total_principal, balance_at_term_end) = match &last {
        Some(m) => (
            m.month,
            m.cumulative_interest,
            m.cumulative_principal,
            m.closing_balance,
        ),
        None => (0, Decimal::ZERO, Decimal::ZERO, terms.principal),
    };

    let interest_without_overpayment = if terms.monthly_overpayment.is_zero() {
        total_interest
    } else {
        let baseline = LoanTerms {
            monthly_overpayment: Decimal::ZERO,
            ..terms.clone()
        };
        LoanSchedule::new(&baseline)?
            .months()
            .last()
            .map(|m| m.cumulative_interest)
            .unwrap_or(Decimal::ZERO)
    };

    let original_term_months = schedule.term_months();
    let months_reduced = original_term_months - actual_months;
    let paid_off_early = balance_at_term_end.is_zero() && months_reduced > 0;

    if terms.interest_only && balance_at_term_end > Decimal::ZERO {
        warnings.push(format!(
            "Interest-only loan leaves {} outstanding at the end of the term",
            balance_at_term_end.round_dp(2)
        ));
    }

    let summary = AmortizationSummary {
        monthly_payment: schedule.monthly_payment(),
        total_monthly_payment: schedule.monthly_payment() + terms.monthly_overpayment,
        total_interest,
        total_paid: total_interest + total_principal,
        original_term_months,
        actual_months,
        months_reduced,
        paid_off_early,
        payoff_years: actual_months / 12,
        payoff_months: actual_months % 12,
        interest_without_overpayment,
        interest_saved: (interest_without_overpayment - total_interest).max(Decimal::ZERO),
        balance_at_term_end,
        sensitivity: rate_sensitivity(terms)?,
    };

    debug!(
        "loan simulation complete: {} months, interest {} (saved {})",
        summary.actual_months, summary.total_interest, summary.interest_saved
    );

    let output = AmortizationResult {
        yearly_snapshots,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let methodology = if terms.interest_only {
        "Interest-only mortgage simulation (monthly, with overpayment)"
    } else {
        "Repayment mortgage amortization (level annuity payment, monthly, with overpayment)"
    };
    Ok(with_metadata(methodology, terms, warnings, elapsed, output))
}

/// Level monthly payment for a fresh loan at `annual_rate` percent.
pub fn level_monthly_payment(
    principal: Money,
    annual_rate: Percent,
    term_years: u32,
    interest_only: bool,
) -> UkFinanceResult<Money> {
    let monthly_rate = percent_to_rate(annual_rate) / Decimal::from(12);
    let payment = if interest_only {
        principal
            .checked_mul(monthly_rate)
            .ok_or_else(|| UkFinanceError::InvalidRate {
                field: "annual_rate".into(),
                reason: format!("interest on {principal} at {annual_rate}% is out of range"),
            })?
    } else {
        level_payment(principal, monthly_rate, term_months(term_years)?)?
    };
    Ok(payment.round_dp(INTERNAL_DP))
}

/// Payments at the contract rate plus and minus one point over the original
/// term. The lower rate is floored at zero.
pub fn rate_sensitivity(terms: &LoanTerms) -> UkFinanceResult<RateSensitivity> {
    let higher_rate = terms
        .annual_rate
        .checked_add(SENSITIVITY_SHIFT)
        .ok_or_else(|| UkFinanceError::InvalidRate {
            field: "annual_rate".into(),
            reason: "rate is out of range".into(),
        })?;
    let lower_rate = (terms.annual_rate - SENSITIVITY_SHIFT).max(Decimal::ZERO);
    Ok(RateSensitivity {
        higher_rate,
        higher_rate_payment: level_monthly_payment(
            terms.principal,
            higher_rate,
            terms.term_years,
            terms.interest_only,
        )?,
        lower_rate,
        lower_rate_payment: level_monthly_payment(
            terms.principal,
            lower_rate,
            terms.term_years,
            terms.interest_only,
        )?,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Aggregate the monthly schedule into `term_years` rows. Returns the rows
/// and the last simulated month.
fn roll_up_years(
    schedule: &LoanSchedule,
    term_years: u32,
) -> (Vec<AmortizationYearSnapshot>, Option<AmortizationMonth>) {
    let term_months = schedule.term_months();
    let mut snapshots = Vec::with_capacity(term_years as usize);
    let mut yearly_interest = Decimal::ZERO;
    let mut yearly_principal = Decimal::ZERO;
    let mut last: Option<AmortizationMonth> = None;

    for month in schedule.months() {
        yearly_interest += month.interest;
        yearly_principal += month.principal;

        let year_end = month.month % 12 == 0
            || month.month == term_months
            || month.closing_balance.is_zero();

        if year_end {
            let remaining_months = term_months - month.month;
            let (projected_interest, projected_principal) = reproject(
                month.closing_balance,
                schedule.monthly_rate(),
                remaining_months,
                schedule.is_interest_only(),
            );
            let snapshot = AmortizationYearSnapshot {
                year: month.month.div_ceil(12),
                cumulative_principal_paid: month.cumulative_principal,
                cumulative_interest_paid: month.cumulative_interest,
                remaining_balance: month.closing_balance,
                yearly_principal_paid: yearly_principal,
                yearly_interest_paid: yearly_interest,
                projected_remaining_interest: projected_interest,
                projected_remaining_principal: projected_principal,
            };
            trace!(
                "year {}: balance {} interest {}",
                snapshot.year,
                snapshot.remaining_balance,
                snapshot.yearly_interest_paid
            );
            snapshots.push(snapshot);
            yearly_interest = Decimal::ZERO;
            yearly_principal = Decimal::ZERO;
        }

        last = Some(month);
    }

    // Paid off early: keep a fixed-length table with zero-flow rows that
    // carry the final cumulative totals.
    let (cum_principal, cum_interest) = last
        .as_ref()
        .map(|m| (m.cumulative_principal, m.cumulative_interest))
        .unwrap_or_default();
    while (snapshots.len() as u32) < term_years {
        snapshots.push(AmortizationYearSnapshot {
            year: snapshots.len() as u32 + 1,
            cumulative_principal_paid: cum_principal,
            cumulative_interest_paid: cum_interest,
            remaining_balance: Decimal::ZERO,
            yearly_principal_paid: Decimal::ZERO,
            yearly_interest_paid: Decimal::ZERO,
            projected_remaining_interest: Decimal::ZERO,
            projected_remaining_principal: Decimal::ZERO,
        });
    }

    (snapshots, last)
}

/// Interest and principal still due on `balance` if it were a fresh loan at
/// `monthly_rate` over `remaining_months`.
fn reproject(
    balance: Money,
    monthly_rate: Rate,
    remaining_months: u32,
    interest_only: bool,
) -> (Money, Money) {
    if balance <= Decimal::ZERO {
        return (Decimal::ZERO, Decimal::ZERO);
    }
    if remaining_months == 0 || monthly_rate.is_zero() {
        return (Decimal::ZERO, balance);
    }
    let months = Decimal::from(remaining_months);
    if interest_only {
        return ((balance * monthly_rate).round_dp(INTERNAL_DP) * months, balance);
    }
    match level_payment(balance, monthly_rate, remaining_months) {
        Ok(payment) => {
            let interest = payment.round_dp(INTERNAL_DP) * months - balance;
            (interest.max(Decimal::ZERO), balance)
        }
        Err(_) => (Decimal::ZERO, balance),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
