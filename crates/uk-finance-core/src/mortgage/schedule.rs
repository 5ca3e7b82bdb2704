use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::UkFinanceError;
use crate::time_value::level_payment;
use crate::types::{percent_to_rate, Money, Percent, Rate};
use crate::UkFinanceResult;

/// Longest accepted loan term.
pub const MAX_TERM_YEARS: u32 = 100;

/// Working precision for balances and interest, in decimal places of a pound.
/// Keeps every later addition exact across a 480-month run.
pub const INTERNAL_DP: u32 = 10;

/// Loan terms as entered on the mortgage form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    /// Annual interest rate in percent (4.5 = 4.5%).
    pub annual_rate: Percent,
    pub term_years: u32,
    /// Constant extra principal paid every month.
    #[serde(default)]
    pub monthly_overpayment: Money,
    /// Regular payment covers interest only; only overpayments reduce the balance.
    #[serde(default)]
    pub interest_only: bool,
}

/// One simulated month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationMonth {
    /// 1-based month index.
    pub month: u32,
    pub opening_balance: Money,
    pub interest: Money,
    /// Principal repaid this month, overpayment included.
    pub principal: Money,
    pub payment: Money,
    pub closing_balance: Money,
    pub cumulative_interest: Money,
    pub cumulative_principal: Money,
}

/// Validated loan with its level payment precomputed. `months()` yields the
/// month-by-month schedule lazily and can be called any number of times.
#[derive(Debug, Clone)]
pub struct LoanSchedule {
    principal: Money,
    monthly_rate: Rate,
    term_months: u32,
    payment: Money,
    overpayment: Money,
    interest_only: bool,
}

impl LoanSchedule {
    pub fn new(terms: &LoanTerms) -> UkFinanceResult<Self> {
        validate_terms(terms)?;

        let monthly_rate = percent_to_rate(terms.annual_rate) / Decimal::from(12);
        let term_months = term_months(terms.term_years)?;
        let payment = if terms.interest_only {
            terms.principal.checked_mul(monthly_rate).ok_or_else(|| {
                UkFinanceError::InvalidRate {
                    field: "annual_rate".into(),
                    reason: format!("interest on {} is out of range", terms.principal),
                }
            })?
        } else {
            level_payment(terms.principal, monthly_rate, term_months).map_err(|_| {
                UkFinanceError::InvalidRate {
                    field: "annual_rate".into(),
                    reason: format!(
                        "{}% cannot be compounded over {} months",
                        terms.annual_rate, term_months
                    ),
                }
            })?
        }
        .round_dp(INTERNAL_DP);

        // Every monthly interest and principal figure, and every running
        // total, is bounded by this sum.
        payment
            .checked_add(terms.monthly_overpayment)
            .and_then(|p| p.checked_mul(Decimal::from(term_months)))
            .and_then(|p| p.checked_add(terms.principal))
            .ok_or_else(|| UkFinanceError::InvalidLoan {
                field: "monthly_overpayment".into(),
                reason: "total repayments over the term exceed the representable range".into(),
            })?;

        Ok(LoanSchedule {
            principal: terms.principal,
            monthly_rate,
            term_months,
            payment,
            overpayment: terms.monthly_overpayment,
            interest_only: terms.interest_only,
        })
    }

    /// Contractual monthly payment, excluding any overpayment.
    pub fn monthly_payment(&self) -> Money {
        self.payment
    }

    pub fn monthly_rate(&self) -> Rate {
        self.monthly_rate
    }

    pub fn term_months(&self) -> u32 {
        self.term_months
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn is_interest_only(&self) -> bool {
        self.interest_only
    }

    pub fn months(&self) -> ScheduleMonths<'_> {
        ScheduleMonths {
            schedule: self,
            state: LoanState {
                month_index: 0,
                remaining_balance: self.principal,
                cumulative_interest: Decimal::ZERO,
                cumulative_principal: Decimal::ZERO,
            },
        }
    }
}

#[derive(Debug, Clone)]
struct LoanState {
    month_index: u32,
    remaining_balance: Money,
    cumulative_interest: Money,
    cumulative_principal: Money,
}

/// Iterator over the months of a `LoanSchedule`. Stops at the end of the
/// term or the first month the balance reaches zero, whichever is first.
#[derive(Debug, Clone)]
pub struct ScheduleMonths<'a> {
    schedule: &'a LoanSchedule,
    state: LoanState,
}

impl Iterator for ScheduleMonths<'_> {
    type Item = AmortizationMonth;

    fn next(&mut self) -> Option<Self::Item> {
        let schedule = self.schedule;
        let state = &mut self.state;

        if state.month_index >= schedule.term_months || state.remaining_balance <= Decimal::ZERO {
            return None;
        }

        let opening = state.remaining_balance;
        let interest = (opening * schedule.monthly_rate).round_dp(INTERNAL_DP);
        let scheduled = if schedule.interest_only {
            Decimal::ZERO
        } else {
            (schedule.payment - interest).max(Decimal::ZERO)
        };

        state.month_index += 1;
        let final_repayment_month =
            !schedule.interest_only && state.month_index == schedule.term_months;

        // Clamp to the outstanding balance; the last repayment month also
        // clears any sub-penny residue left by the level payment.
        let mut principal = scheduled + schedule.overpayment;
        if principal > opening || final_repayment_month {
            principal = opening;
        }

        state.remaining_balance = opening - principal;
        state.cumulative_interest += interest;
        state.cumulative_principal += principal;

        Some(AmortizationMonth {
            month: state.month_index,
            opening_balance: opening,
            interest,
            principal,
            payment: interest + principal,
            closing_balance: state.remaining_balance,
            cumulative_interest: state.cumulative_interest,
            cumulative_principal: state.cumulative_principal,
        })
    }
}

/// Number of monthly periods in `term_years`.
pub fn term_months(term_years: u32) -> UkFinanceResult<u32> {
    term_years
        .checked_mul(12)
        .ok_or_else(|| UkFinanceError::InvalidLoan {
            field: "term_years".into(),
            reason: format!("{term_years} years is too many months"),
        })
}

fn validate_terms(terms: &LoanTerms) -> UkFinanceResult<()> {
    if terms.principal <= Decimal::ZERO {
        return Err(UkFinanceError::InvalidLoan {
            field: "principal".into(),
            reason: "principal must be greater than zero".into(),
        });
    }
    if terms.term_years == 0 {
        return Err(UkFinanceError::InvalidLoan {
            field: "term_years".into(),
            reason: "term must be at least one year".into(),
        });
    }
    if terms.term_years > MAX_TERM_YEARS {
        return Err(UkFinanceError::InvalidLoan {
            field: "term_years".into(),
            reason: format!("term must not exceed {MAX_TERM_YEARS} years"),
        });
    }
    if terms.annual_rate < Decimal::ZERO {
        return Err(UkFinanceError::InvalidRate {
            field: "annual_rate".into(),
            reason: "interest rate must be non-negative".into(),
        });
    }
    if terms.monthly_overpayment < Decimal::ZERO {
        return Err(UkFinanceError::InvalidLoan {
            field: "monthly_overpayment".into(),
            reason: "overpayment must be non-negative".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn terms() -> LoanTerms {
        LoanTerms {
            principal: dec!(225_000),
            annual_rate: dec!(4.5),
            term_years: 25,
            monthly_overpayment: Decimal::ZERO,
            interest_only: false,
        }
    }

    #[test]
    fn test_first_month_split() {
        let schedule = LoanSchedule::new(&terms()).unwrap();
        let first = schedule.months().next().unwrap();
        assert_eq!(first.month, 1);
        assert_eq!(first.interest, dec!(843.75));
        assert_eq!(first.principal, schedule.monthly_payment() - dec!(843.75));
    }

    #[test]
    fn test_full_term_clears_balance() {
        let schedule = LoanSchedule::new(&terms()).unwrap();
        let months: Vec<AmortizationMonth> = schedule.months().collect();
        assert_eq!(months.len(), 300);
        let last = months.last().unwrap();
        assert_eq!(last.closing_balance, Decimal::ZERO);
        assert_eq!(last.cumulative_principal, dec!(225_000));
    }

    #[test]
    fn test_months_is_restartable() {
        let schedule = LoanSchedule::new(&terms()).unwrap();
        let a: Vec<AmortizationMonth> = schedule.months().collect();
        let b: Vec<AmortizationMonth> = schedule.months().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_overpayment_stops_early() {
        let mut t = terms();
        t.monthly_overpayment = dec!(100);
        let schedule = LoanSchedule::new(&t).unwrap();
        let months: Vec<AmortizationMonth> = schedule.months().collect();
        assert_eq!(months.len(), 262);
        assert_eq!(months.last().unwrap().closing_balance, Decimal::ZERO);
    }

    #[test]
    fn test_interest_only_keeps_balance() {
        let mut t = terms();
        t.interest_only = true;
        let schedule = LoanSchedule::new(&t).unwrap();
        assert_eq!(schedule.monthly_payment(), dec!(843.75));
        let last = schedule.months().last().unwrap();
        assert_eq!(last.month, 300);
        assert_eq!(last.closing_balance, dec!(225_000));
        assert_eq!(last.cumulative_interest, dec!(253_125));
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let mut t = terms();
        t.annual_rate = Decimal::ZERO;
        let schedule = LoanSchedule::new(&t).unwrap();
        assert_eq!(schedule.monthly_payment(), dec!(750));
        for m in schedule.months() {
            assert_eq!(m.interest, Decimal::ZERO);
            assert_eq!(m.principal, dec!(750));
        }
    }

    #[test]
    fn test_invalid_terms_rejected() {
        let mut t = terms();
        t.principal = Decimal::ZERO;
        assert!(matches!(
            LoanSchedule::new(&t).unwrap_err(),
            UkFinanceError::InvalidLoan { .. }
        ));

        let mut t = terms();
        t.term_years = 0;
        assert!(matches!(
            LoanSchedule::new(&t).unwrap_err(),
            UkFinanceError::InvalidLoan { .. }
        ));

        let mut t = terms();
        t.annual_rate = dec!(-0.5);
        assert!(matches!(
            LoanSchedule::new(&t).unwrap_err(),
            UkFinanceError::InvalidRate { .. }
        ));
    }

    #[test]
    fn test_rate_too_high_to_compound_rejected() {
        let t = LoanTerms {
            principal: dec!(200_000),
            annual_rate: dec!(1000),
            term_years: 40,
            monthly_overpayment: Decimal::ZERO,
            interest_only: false,
        };
        let err = LoanSchedule::new(&t).unwrap_err();
        assert!(matches!(err, UkFinanceError::InvalidRate { ref field, .. } if field == "annual_rate"));
    }

    #[test]
    fn test_interest_only_at_high_rate_needs_no_compounding() {
        let mut t = terms();
        t.annual_rate = dec!(1000);
        t.interest_only = true;
        let schedule = LoanSchedule::new(&t).unwrap();
        assert_eq!(schedule.monthly_payment(), dec!(187_500));
        assert_eq!(schedule.months().count(), 300);
    }

    #[test]
    fn test_term_bounds() {
        assert!(term_months(u32::MAX).is_err());
        assert_eq!(term_months(MAX_TERM_YEARS).unwrap(), 1_200);

        let mut t = terms();
        t.term_years = MAX_TERM_YEARS + 1;
        assert!(matches!(
            LoanSchedule::new(&t).unwrap_err(),
            UkFinanceError::InvalidLoan { .. }
        ));
    }

    #[test]
    fn test_overpayment_beyond_range_rejected() {
        let mut t = terms();
        t.monthly_overpayment = Decimal::MAX;
        assert!(matches!(
            LoanSchedule::new(&t).unwrap_err(),
            UkFinanceError::InvalidLoan { .. }
        ));
    }
}
