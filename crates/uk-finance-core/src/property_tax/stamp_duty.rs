use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::bands::schedules::{
    first_time_buyer_relief_applies, property_tax_name, property_tax_schedule, surcharge_applies,
    BuyerStatus, PropertyRegion,
};
use crate::bands::BandBreakdown;
use crate::error::UkFinanceError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::UkFinanceResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyTaxInput {
    pub price: Money,
    #[serde(default)]
    pub region: PropertyRegion,
    #[serde(default)]
    pub buyer_status: BuyerStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyTaxOutput {
    /// SDLT, LBTT or LTT.
    pub tax_name: String,
    pub total_tax: Money,
    /// Tax the same purchase would attract at standard residential rates.
    pub standard_tax: Money,
    /// Additional-dwelling surcharge included in `total_tax`.
    pub surcharge: Money,
    /// Saving against standard rates from first-time buyer relief.
    pub first_time_buyer_saving: Money,
    pub effective_rate: Rate,
    pub breakdown: BandBreakdown,
}

/// Land transaction tax on a residential purchase.
pub fn calculate_property_tax(
    input: &PropertyTaxInput,
) -> UkFinanceResult<ComputationOutput<PropertyTaxOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.price < Decimal::ZERO {
        return Err(UkFinanceError::InvalidInput {
            field: "price".into(),
            reason: "price must be non-negative".into(),
        });
    }

    let tax_name = property_tax_name(input.region);
    let breakdown = property_tax_schedule(input.price, input.region, input.buyer_status)?
        .apply(input.price);
    let standard_tax = property_tax_schedule(input.price, input.region, BuyerStatus::Standard)?
        .apply(input.price)
        .total_tax;

    let surcharge = if surcharge_applies(input.price, input.buyer_status) {
        breakdown.total_tax - standard_tax
    } else {
        Decimal::ZERO
    };
    let first_time_buyer_saving =
        if first_time_buyer_relief_applies(input.price, input.region, input.buyer_status) {
            standard_tax - breakdown.total_tax
        } else {
            Decimal::ZERO
        };

    if input.buyer_status == BuyerStatus::FirstTimeBuyer
        && !first_time_buyer_relief_applies(input.price, input.region, input.buyer_status)
    {
        warnings.push(format!(
            "First-time buyer relief does not apply to this purchase; standard {tax_name} rates used"
        ));
    }
    if input.buyer_status == BuyerStatus::AdditionalProperty && surcharge.is_zero() {
        warnings.push("Price is below the additional-dwelling threshold; no surcharge".into());
    }

    let output = PropertyTaxOutput {
        tax_name: tax_name.to_string(),
        total_tax: breakdown.total_tax,
        standard_tax,
        surcharge,
        first_time_buyer_saving,
        effective_rate: breakdown.effective_rate(),
        breakdown,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        &format!("{tax_name} residential rates (marginal bands)"),
        input,
        warnings,
        elapsed,
        output,
    ))
}
