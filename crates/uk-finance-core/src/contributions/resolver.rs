use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::UkFinanceError;
use crate::types::{percent_to_rate, Money};
use crate::UkFinanceResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Whether `value` is a cash amount or a percentage of earnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    Fixed,
    Percentage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            Frequency::Monthly => 12,
            Frequency::Yearly => 1,
        }
    }
}

/// Which slice of earnings a percentage applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EarningsBasis {
    #[default]
    Total,
    /// Only earnings between the qualifying band's lower and upper limits.
    Qualifying,
}

/// A pension (or sacrifice) contribution as entered on a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionDeclaration {
    pub value: Money,
    pub value_type: ValueType,
    pub frequency: Frequency,
    #[serde(default)]
    pub earnings_basis: EarningsBasis,
}

impl ContributionDeclaration {
    pub fn percentage_of_total(pct: Decimal) -> Self {
        ContributionDeclaration {
            value: pct,
            value_type: ValueType::Percentage,
            frequency: Frequency::Yearly,
            earnings_basis: EarningsBasis::Total,
        }
    }

    pub fn percentage_of_qualifying(pct: Decimal) -> Self {
        ContributionDeclaration {
            value: pct,
            value_type: ValueType::Percentage,
            frequency: Frequency::Yearly,
            earnings_basis: EarningsBasis::Qualifying,
        }
    }

    pub fn fixed(value: Money, frequency: Frequency) -> Self {
        ContributionDeclaration {
            value,
            value_type: ValueType::Fixed,
            frequency,
            earnings_basis: EarningsBasis::Total,
        }
    }
}

/// Lower and upper earnings limits for qualifying-earnings contributions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualifyingEarningsBand {
    pub lower: Money,
    pub upper: Money,
}

impl QualifyingEarningsBand {
    /// Auto-enrolment qualifying earnings band, 2025/26.
    pub const AUTO_ENROLMENT: QualifyingEarningsBand = QualifyingEarningsBand {
        lower: dec!(6_240),
        upper: dec!(50_270),
    };

    /// Earnings falling inside the band: zero below `lower`, capped at the
    /// band width above `upper`.
    pub fn qualifying_earnings(&self, earnings: Money) -> Money {
        (earnings.min(self.upper) - self.lower).max(Decimal::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve a declaration against `earnings`.
///
/// Percentages apply to total or qualifying earnings depending on the
/// declaration's basis. Fixed values come back as declared (per their own
/// frequency), except that a qualifying-basis fixed amount is zero when no
/// earnings qualify.
pub fn resolve(
    earnings: Money,
    declaration: &ContributionDeclaration,
    qualifying_band: Option<&QualifyingEarningsBand>,
) -> UkFinanceResult<Money> {
    validate_declaration(declaration)?;
    let earnings = earnings.max(Decimal::ZERO);

    let base = match declaration.earnings_basis {
        EarningsBasis::Total => earnings,
        EarningsBasis::Qualifying => {
            let band = qualifying_band.ok_or_else(|| UkFinanceError::InvalidInput {
                field: "qualifying_band".into(),
                reason: "qualifying earnings basis requires a qualifying earnings band".into(),
            })?;
            if band.lower > band.upper {
                return Err(UkFinanceError::InvalidRange {
                    field: "qualifying_band".into(),
                    reason: format!(
                        "lower limit {} exceeds upper limit {}",
                        band.lower, band.upper
                    ),
                });
            }
            band.qualifying_earnings(earnings)
        }
    };

    let amount = match declaration.value_type {
        ValueType::Percentage => base * percent_to_rate(declaration.value),
        ValueType::Fixed => {
            if declaration.earnings_basis == EarningsBasis::Qualifying && base.is_zero() {
                Decimal::ZERO
            } else {
                declaration.value
            }
        }
    };

    Ok(amount)
}

/// Resolve then annualise: fixed monthly amounts are multiplied by twelve.
/// Percentages of annual earnings are already annual.
pub fn annual_contribution(
    annual_earnings: Money,
    declaration: &ContributionDeclaration,
    qualifying_band: Option<&QualifyingEarningsBand>,
) -> UkFinanceResult<Money> {
    let resolved = resolve(annual_earnings, declaration, qualifying_band)?;
    match declaration.value_type {
        ValueType::Fixed => resolved
            .checked_mul(Decimal::from(declaration.frequency.periods_per_year()))
            .ok_or_else(|| UkFinanceError::InvalidInput {
                field: "value".into(),
                reason: format!("{resolved} per period is out of range"),
            }),
        ValueType::Percentage => Ok(resolved),
    }
}

fn validate_declaration(declaration: &ContributionDeclaration) -> UkFinanceResult<()> {
    if declaration.value < Decimal::ZERO {
        return Err(UkFinanceError::InvalidInput {
            field: "value".into(),
            reason: "contribution must be non-negative".into(),
        });
    }
    if declaration.value_type == ValueType::Percentage && declaration.value > dec!(100) {
        return Err(UkFinanceError::InvalidInput {
            field: "value".into(),
            reason: "percentage contribution must be between 0 and 100".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
