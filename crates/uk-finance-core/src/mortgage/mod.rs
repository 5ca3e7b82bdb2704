pub mod amortization;
pub mod schedule;

pub use amortization::{simulate_amortization, AmortizationResult, AmortizationSummary, AmortizationYearSnapshot};
pub use schedule::{AmortizationMonth, LoanSchedule, LoanTerms};
