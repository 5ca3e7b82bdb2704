pub mod csv_out;
pub mod minimal;
pub mod table;

use std::io::{self, Write};

use serde_json::Value;
use uk_finance_core::mortgage::AmortizationMonth;

use crate::OutputFormat;

/// Render a finished calculation envelope.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("JSON serialization error: {}", e),
        },
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Write a monthly schedule to stdout as the iterator yields it.
///
/// The table layout sizes columns from every row, so it collects first.
pub fn stream_months<I>(format: &OutputFormat, months: I) -> Result<(), Box<dyn std::error::Error>>
where
    I: Iterator<Item = AmortizationMonth>,
{
    if let OutputFormat::Table = format {
        let rows: Vec<AmortizationMonth> = months.collect();
        table::print_table(&serde_json::to_value(rows)?);
        return Ok(());
    }
    write_months(format, months, io::stdout().lock())
}

/// JSON is one object per line, CSV one row per month, minimal one
/// `month closing_balance` pair per line.
fn write_months<I, W>(format: &OutputFormat, months: I, mut out: W) -> Result<(), Box<dyn std::error::Error>>
where
    I: Iterator<Item = AmortizationMonth>,
    W: Write,
{
    match format {
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(out);
            for month in months {
                wtr.serialize(&month)?;
            }
            wtr.flush()?;
            return Ok(());
        }
        OutputFormat::Minimal => {
            for month in months {
                writeln!(out, "{} {:.2}", month.month, month.closing_balance)?;
            }
        }
        OutputFormat::Json | OutputFormat::Table => {
            for month in months {
                serde_json::to_writer(&mut out, &month)?;
                writeln!(out)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uk_finance_core::mortgage::{LoanSchedule, LoanTerms};

    fn schedule() -> LoanSchedule {
        LoanSchedule::new(&LoanTerms {
            principal: dec!(12_000),
            annual_rate: dec!(0),
            term_years: 1,
            monthly_overpayment: dec!(0),
            interest_only: false,
        })
        .unwrap()
    }

    fn render(format: OutputFormat) -> String {
        let mut buf = Vec::new();
        write_months(&format, schedule().months(), &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_json_lines_one_month_per_line() {
        let text = render(OutputFormat::Json);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 12);
        let last: AmortizationMonth = serde_json::from_str(lines[11]).unwrap();
        assert_eq!(last.month, 12);
        assert_eq!(last.closing_balance, dec!(0));
    }

    #[test]
    fn test_csv_has_header_and_month_rows() {
        let text = render(OutputFormat::Csv);
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("month,opening_balance"));
        assert_eq!(lines.count(), 12);
    }

    #[test]
    fn test_minimal_prints_closing_balances() {
        let text = render(OutputFormat::Minimal);
        assert_eq!(text.lines().next(), Some("1 11000.00"));
        assert_eq!(text.lines().last(), Some("12 0.00"));
    }

    #[test]
    fn test_stops_when_iterator_is_cut_short() {
        let mut buf = Vec::new();
        write_months(&OutputFormat::Json, schedule().months().take(3), &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 3);
    }
}
