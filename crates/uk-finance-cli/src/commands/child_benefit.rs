use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use uk_finance_core::child_benefit::hicbc::{self, ChildBenefitInput};

use crate::input;

/// Arguments for Child Benefit and the High Income Child Benefit Charge
#[derive(Args)]
pub struct ChildBenefitArgs {
    /// Adjusted net income of the higher earner
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Number of children claimed for
    #[arg(long, default_value = "1")]
    pub children: u32,

    /// Weeks of benefit received in the tax year (defaults to 52)
    #[arg(long)]
    pub weeks: Option<u32>,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_child_benefit(args: ChildBenefitArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cb_input: ChildBenefitInput = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => ChildBenefitInput {
            adjusted_net_income: args
                .income
                .ok_or("--income is required (or provide --input)")?,
            number_of_children: args.children,
            weeks_claimed: args.weeks,
        },
    };

    let result = hicbc::calculate_child_benefit(&cb_input)?;
    Ok(serde_json::to_value(result)?)
}
