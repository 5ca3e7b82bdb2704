use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use uk_finance_core::bands::schedules::{BuyerStatus, PropertyRegion};
use uk_finance_core::property_tax::stamp_duty::{self, PropertyTaxInput};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RegionArg {
    England,
    NorthernIreland,
    Scotland,
    Wales,
}

impl From<RegionArg> for PropertyRegion {
    fn from(r: RegionArg) -> Self {
        match r {
            RegionArg::England => PropertyRegion::England,
            RegionArg::NorthernIreland => PropertyRegion::NorthernIreland,
            RegionArg::Scotland => PropertyRegion::Scotland,
            RegionArg::Wales => PropertyRegion::Wales,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BuyerArg {
    Standard,
    FirstTimeBuyer,
    AdditionalProperty,
}

impl From<BuyerArg> for BuyerStatus {
    fn from(b: BuyerArg) -> Self {
        match b {
            BuyerArg::Standard => BuyerStatus::Standard,
            BuyerArg::FirstTimeBuyer => BuyerStatus::FirstTimeBuyer,
            BuyerArg::AdditionalProperty => BuyerStatus::AdditionalProperty,
        }
    }
}

/// Arguments for SDLT / LBTT / LTT
#[derive(Args)]
pub struct PropertyTaxArgs {
    /// Purchase price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Where the property is
    #[arg(long, value_enum, default_value = "england")]
    pub region: RegionArg,

    /// Buyer circumstances
    #[arg(long, value_enum, default_value = "standard")]
    pub buyer: BuyerArg,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_property_tax(args: PropertyTaxArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let tax_input: PropertyTaxInput = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => PropertyTaxInput {
            price: args.price.ok_or("--price is required (or provide --input)")?,
            region: args.region.into(),
            buyer_status: args.buyer.into(),
        },
    };

    let result = stamp_duty::calculate_property_tax(&tax_input)?;
    Ok(serde_json::to_value(result)?)
}
