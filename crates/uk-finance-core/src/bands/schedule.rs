use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::UkFinanceError;
use crate::types::{Money, Rate};
use crate::UkFinanceResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One band of a progressive schedule. `upper_bound: None` is the unbounded
/// top band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub upper_bound: Option<Money>,
    pub rate: Rate,
}

impl Band {
    pub fn bounded(upper_bound: Money, rate: Rate) -> Self {
        Band {
            upper_bound: Some(upper_bound),
            rate,
        }
    }

    pub fn unbounded(rate: Rate) -> Self {
        Band {
            upper_bound: None,
            rate,
        }
    }
}

/// Ordered, validated list of bands partitioning `[0, inf)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Band>", into = "Vec<Band>")]
pub struct BandedSchedule {
    bands: Vec<Band>,
}

/// The part of an amount falling inside one band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandSlice {
    pub lower_bound: Money,
    pub upper_bound: Option<Money>,
    pub rate: Rate,
    pub amount: Money,
    pub tax: Money,
}

/// Result of applying a schedule: one slice per band, in band order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandBreakdown {
    pub total_tax: Money,
    pub slices: Vec<BandSlice>,
}

impl BandBreakdown {
    /// Amount attributed to each band, aligned with the schedule's bands.
    pub fn per_band_amounts(&self) -> Vec<Money> {
        self.slices.iter().map(|s| s.amount).collect()
    }

    /// Sum of all slices; equals the (non-negative) amount applied.
    pub fn total_amount(&self) -> Money {
        self.slices.iter().map(|s| s.amount).sum()
    }

    /// Rate of the highest band the amount reached.
    pub fn marginal_rate(&self) -> Rate {
        self.slices
            .iter()
            .rev()
            .find(|s| s.amount > Decimal::ZERO)
            .map(|s| s.rate)
            .unwrap_or(Decimal::ZERO)
    }

    /// total_tax / amount, zero for a zero amount.
    pub fn effective_rate(&self) -> Rate {
        let amount = self.total_amount();
        if amount.is_zero() {
            Decimal::ZERO
        } else {
            self.total_tax / amount
        }
    }
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

impl BandedSchedule {
    /// Validate and build a schedule. Upper bounds must be strictly
    /// increasing from zero, only the last band may be unbounded and it must
    /// be, and rates must be non-negative.
    pub fn new(bands: Vec<Band>) -> UkFinanceResult<Self> {
        validate_bands(&bands)?;
        Ok(BandedSchedule { bands })
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// Marginal application: each band taxes only the slice of `amount`
    /// lying within it. Negative amounts are treated as zero.
    pub fn apply(&self, amount: Money) -> BandBreakdown {
        let mut remaining = amount.max(Decimal::ZERO);
        let mut previous_upper = Decimal::ZERO;
        let mut total_tax = Decimal::ZERO;
        let mut slices = Vec::with_capacity(self.bands.len());

        for band in &self.bands {
            let slice = if remaining <= Decimal::ZERO {
                Decimal::ZERO
            } else {
                match band.upper_bound {
                    Some(upper) => remaining.min(upper - previous_upper),
                    None => remaining,
                }
            };
            let tax = slice * band.rate;
            remaining -= slice;
            total_tax += tax;

            slices.push(BandSlice {
                lower_bound: previous_upper,
                upper_bound: band.upper_bound,
                rate: band.rate,
                amount: slice,
                tax,
            });

            if let Some(upper) = band.upper_bound {
                previous_upper = upper;
            }
        }

        BandBreakdown { total_tax, slices }
    }
}

impl TryFrom<Vec<Band>> for BandedSchedule {
    type Error = UkFinanceError;

    fn try_from(bands: Vec<Band>) -> Result<Self, Self::Error> {
        BandedSchedule::new(bands)
    }
}

impl From<BandedSchedule> for Vec<Band> {
    fn from(schedule: BandedSchedule) -> Self {
        schedule.bands
    }
}

/// Validate `bands` and apply them to `amount` in one step.
pub fn apply(amount: Money, bands: &[Band]) -> UkFinanceResult<BandBreakdown> {
    validate_bands(bands)?;
    Ok(BandedSchedule {
        bands: bands.to_vec(),
    }
    .apply(amount))
}

fn validate_bands(bands: &[Band]) -> UkFinanceResult<()> {
    if bands.is_empty() {
        return Err(UkFinanceError::InvalidSchedule(
            "schedule must contain at least one band".into(),
        ));
    }

    let mut previous_upper = Decimal::ZERO;
    let last = bands.len() - 1;

    for (i, band) in bands.iter().enumerate() {
        if band.rate < Decimal::ZERO {
            return Err(UkFinanceError::InvalidSchedule(format!(
                "band {i} has negative rate {}",
                band.rate
            )));
        }
        match band.upper_bound {
            Some(upper) => {
                if i == last {
                    return Err(UkFinanceError::InvalidSchedule(
                        "final band must be unbounded".into(),
                    ));
                }
                if upper <= previous_upper {
                    return Err(UkFinanceError::InvalidSchedule(format!(
                        "band {i} upper bound {upper} is not above previous bound {previous_upper}"
                    )));
                }
                previous_upper = upper;
            }
            None => {
                if i != last {
                    return Err(UkFinanceError::InvalidSchedule(format!(
                        "band {i} is unbounded but is not the final band"
                    )));
                }
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
