use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use uk_finance_core::bands::BandedSchedule;

use crate::input;

/// Arguments for applying an arbitrary banded schedule
#[derive(Args)]
pub struct BandsArgs {
    /// Amount to split across the bands (overrides the file's amount)
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Path to JSON or YAML file with `bands` and optionally `amount`
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Deserialize)]
struct BandsInput {
    #[serde(default)]
    amount: Option<Decimal>,
    bands: BandedSchedule,
}

pub fn run_bands(args: BandsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let bands_input: BandsInput = input::load(args.input.as_deref())?
        .ok_or("--input <file> or stdin with a `bands` list is required")?;
    let amount = args
        .amount
        .or(bands_input.amount)
        .ok_or("--amount is required when the input has no `amount`")?;

    let breakdown = bands_input.bands.apply(amount);
    Ok(serde_json::to_value(breakdown)?)
}
