mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::bands::BandsArgs;
use commands::child_benefit::ChildBenefitArgs;
use commands::mortgage::AmortizationArgs;
use commands::pension::PensionProjectionArgs;
use commands::property_tax::PropertyTaxArgs;
use commands::take_home::TakeHomeArgs;

/// UK personal-finance projections
#[derive(Parser)]
#[command(
    name = "ukfin",
    version,
    about = "UK personal-finance projections",
    long_about = "A CLI for UK personal-finance calculations with decimal precision. \
                  Supports pension pot projections, mortgage amortization with \
                  overpayments, stamp duty, Child Benefit charge, and take-home pay."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Project a defined-contribution pension pot to retirement
    PensionProjection(PensionProjectionArgs),
    /// Simulate a mortgage with optional monthly overpayments
    Amortization(AmortizationArgs),
    /// Stamp Duty Land Tax, LBTT or LTT on a purchase
    PropertyTax(PropertyTaxArgs),
    /// Child Benefit net of the High Income Child Benefit Charge
    ChildBenefit(ChildBenefitArgs),
    /// Annual take-home pay after tax, NI, pension and student loans
    TakeHome(TakeHomeArgs),
    /// Apply an arbitrary banded schedule to an amount
    Bands(BandsArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let result: Result<Option<serde_json::Value>, Box<dyn std::error::Error>> = match cli.command {
        Commands::PensionProjection(args) => commands::pension::run_pension_projection(args).map(Some),
        Commands::Amortization(args) => commands::mortgage::run_amortization(args, &cli.output),
        Commands::PropertyTax(args) => commands::property_tax::run_property_tax(args).map(Some),
        Commands::ChildBenefit(args) => commands::child_benefit::run_child_benefit(args).map(Some),
        Commands::TakeHome(args) => commands::take_home::run_take_home(args).map(Some),
        Commands::Bands(args) => commands::bands::run_bands(args).map(Some),
        Commands::Version => {
            println!("ukfin {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(Some(value)) => output::format_output(&cli.output, &value),
        Ok(None) => {}
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
