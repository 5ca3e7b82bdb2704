use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::bands::schedules::child_benefit_taper_schedule;
use crate::error::UkFinanceError;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::UkFinanceResult;

/// Weekly rate for the eldest or only child, 2025/26.
pub const ELDEST_CHILD_WEEKLY: Money = dec!(26.05);
/// Weekly rate for each additional child, 2025/26.
pub const ADDITIONAL_CHILD_WEEKLY: Money = dec!(17.25);

const WEEKS_PER_YEAR: u32 = 52;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildBenefitInput {
    /// Adjusted net income of the higher-earning partner.
    pub adjusted_net_income: Money,
    pub number_of_children: u32,
    /// Weeks of entitlement in the tax year. Defaults to 52.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weeks_claimed: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildBenefitOutput {
    pub weekly_benefit: Money,
    pub annual_benefit: Money,
    /// Share of the benefit clawed back, whole percent 0 to 100.
    pub charge_percentage: Percent,
    pub high_income_charge: Money,
    pub net_benefit: Money,
    /// Income at or above the full-charge point; claiming only protects NI credits.
    pub fully_clawed_back: bool,
}

/// Child Benefit entitlement less the High Income Child Benefit Charge.
pub fn calculate_child_benefit(
    input: &ChildBenefitInput,
) -> UkFinanceResult<ComputationOutput<ChildBenefitOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let weeks = input.weeks_claimed.unwrap_or(WEEKS_PER_YEAR);
    if weeks > 53 {
        return Err(UkFinanceError::InvalidInput {
            field: "weeks_claimed".into(),
            reason: "a tax year has at most 53 payment weeks".into(),
        });
    }

    let weekly_benefit = match input.number_of_children {
        0 => Decimal::ZERO,
        n => ELDEST_CHILD_WEEKLY + ADDITIONAL_CHILD_WEEKLY * Decimal::from(n - 1),
    };
    let annual_benefit = weekly_benefit * Decimal::from(weeks);

    // Taper yields percentage points; HMRC rounds down to a whole percent.
    let taper = child_benefit_taper_schedule()?.apply(input.adjusted_net_income);
    let charge_percentage = taper.total_tax.floor().min(dec!(100));
    let high_income_charge = (annual_benefit * charge_percentage / dec!(100)).floor();
    let net_benefit = annual_benefit - high_income_charge;
    let fully_clawed_back = annual_benefit > Decimal::ZERO && charge_percentage >= dec!(100);

    if fully_clawed_back {
        warnings.push(
            "Charge cancels the benefit; consider claiming but opting out of payments to keep NI credits"
                .into(),
        );
    }

    let output = ChildBenefitOutput {
        weekly_benefit,
        annual_benefit,
        charge_percentage,
        high_income_charge,
        net_benefit,
        fully_clawed_back,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Child Benefit with High Income Child Benefit Charge taper",
        input,
        warnings,
        elapsed,
        output,
    ))
}
