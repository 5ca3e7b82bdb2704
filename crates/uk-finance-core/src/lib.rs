pub mod bands;
pub mod contributions;
pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "pension")]
pub mod pension;

#[cfg(feature = "mortgage")]
pub mod mortgage;

#[cfg(feature = "property_tax")]
pub mod property_tax;

#[cfg(feature = "child_benefit")]
pub mod child_benefit;

#[cfg(feature = "take_home")]
pub mod take_home;

pub use error::UkFinanceError;
pub use types::*;

/// Standard result type for all uk-finance operations
pub type UkFinanceResult<T> = Result<T, UkFinanceError>;
