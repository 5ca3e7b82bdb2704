use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use uk_finance_core::mortgage::{simulate_amortization, LoanSchedule, LoanTerms};

use crate::input;
use crate::output;
use crate::OutputFormat;

/// Arguments for mortgage amortization
#[derive(Args)]
pub struct AmortizationArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 4.5)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in whole years
    #[arg(long, default_value = "25")]
    pub term_years: u32,

    /// Extra principal paid every month
    #[arg(long, default_value = "0")]
    pub overpayment: Decimal,

    /// Pay interest only; the principal is due at the end of the term
    #[arg(long)]
    pub interest_only: bool,

    /// Stream the month-by-month schedule (JSON lines under `--output json`)
    /// instead of the yearly summary
    #[arg(long)]
    pub monthly: bool,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// `Ok(None)` when `--monthly` has already written the schedule.
pub fn run_amortization(
    args: AmortizationArgs,
    format: &OutputFormat,
) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let terms: LoanTerms = match input::load(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => LoanTerms {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            term_years: args.term_years,
            monthly_overpayment: args.overpayment,
            interest_only: args.interest_only,
        },
    };

    if args.monthly {
        let schedule = LoanSchedule::new(&terms)?;
        output::stream_months(format, schedule.months())?;
        return Ok(None);
    }

    let result = simulate_amortization(&terms)?;
    Ok(Some(serde_json::to_value(result)?))
}
