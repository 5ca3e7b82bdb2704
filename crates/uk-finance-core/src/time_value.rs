use rust_decimal::Decimal;

use crate::error::UkFinanceError;
use crate::types::{Money, Rate};
use crate::UkFinanceResult;

fn out_of_range(field: &str, reason: String) -> UkFinanceError {
    UkFinanceError::InvalidRate {
        field: field.into(),
        reason,
    }
}

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
/// Fails with `InvalidRate` when the power leaves Decimal's range.
pub fn compound(rate: Rate, n: u32) -> UkFinanceResult<Decimal> {
    let factor = Decimal::ONE
        .checked_add(rate)
        .ok_or_else(|| out_of_range("rate", format!("1 + {rate} is out of range")))?;
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result = result.checked_mul(factor).ok_or_else(|| {
            out_of_range(
                "rate",
                format!("(1 + {rate})^{n} exceeds the representable range"),
            )
        })?;
    }
    Ok(result)
}

/// Deflate a nominal value `years` periods into today's money.
pub fn deflate(nominal: Money, inflation: Rate, years: u32) -> UkFinanceResult<Money> {
    let factor = compound(inflation, years)?;
    if factor.is_zero() {
        return Ok(nominal);
    }
    nominal.checked_div(factor).ok_or_else(|| {
        out_of_range(
            "inflation_rate",
            format!("deflating {nominal} over {years} years exceeds the representable range"),
        )
    })
}

/// Level payment that amortises `principal` over `nper` periods:
/// P * r(1+r)^n / ((1+r)^n - 1). Degrades to straight-line P / n at r = 0.
pub fn level_payment(principal: Money, rate: Rate, nper: u32) -> UkFinanceResult<Money> {
    if nper == 0 {
        return Err(UkFinanceError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    let factor = compound(rate, nper)?;
    let denom = factor - Decimal::ONE;

    if denom.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    principal
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(factor))
        .and_then(|v| v.checked_div(denom))
        .ok_or_else(|| {
            out_of_range(
                "rate",
                format!("level payment on {principal} at {rate} over {nper} periods is out of range"),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_compound_basic() {
        assert_eq!(compound(dec!(0.10), 2).unwrap(), dec!(1.21));
        assert_eq!(compound(dec!(0.05), 0).unwrap(), Decimal::ONE);
    }

    #[test]
    fn test_deflate_zero_years_is_identity() {
        assert_eq!(deflate(dec!(1000), dec!(0.02), 0).unwrap(), dec!(1000));
    }

    #[test]
    fn test_deflate_one_year() {
        assert_eq!(deflate(dec!(102), dec!(0.02), 1).unwrap(), dec!(100));
    }

    #[test]
    fn test_level_payment_zero_rate_is_straight_line() {
        let pmt = level_payment(dec!(225_000), Decimal::ZERO, 300).unwrap();
        assert_eq!(pmt, dec!(750));
    }

    #[test]
    fn test_level_payment_reference_mortgage() {
        // 225k at 4.5% over 25 years: ~1,250.62 per month
        let pmt = level_payment(dec!(225_000), dec!(0.045) / dec!(12), 300).unwrap();
        assert!((pmt - dec!(1250.62)).abs() < dec!(0.01), "pmt={}", pmt);
    }

    #[test]
    fn test_level_payment_zero_periods_rejected() {
        assert!(level_payment(dec!(1000), dec!(0.01), 0).is_err());
    }

    #[test]
    fn test_compound_overflow_is_an_error() {
        // 11^82 is far beyond Decimal::MAX
        let err = compound(dec!(10), 82).unwrap_err();
        assert!(matches!(err, UkFinanceError::InvalidRate { .. }));
    }

    #[test]
    fn test_deflate_overflow_is_an_error() {
        let err = deflate(dec!(1_000_000), dec!(1.5), 82).unwrap_err();
        assert!(matches!(err, UkFinanceError::InvalidRate { .. }));
    }

    #[test]
    fn test_level_payment_at_extreme_rate_is_an_error() {
        // 1000% a year over 40 years of monthly periods
        let err = level_payment(dec!(200_000), dec!(10) / dec!(12), 480).unwrap_err();
        assert!(matches!(err, UkFinanceError::InvalidRate { .. }));
    }
}
