use thiserror::Error;

#[derive(Debug, Error)]
pub enum UkFinanceError {
    /// Age or term ordering violated (e.g. retirement age not after current age).
    #[error("Invalid range: {field}: {reason}")]
    InvalidRange { field: String, reason: String },

    /// Non-positive principal or term.
    #[error("Invalid loan: {field}: {reason}")]
    InvalidLoan { field: String, reason: String },

    #[error("Invalid rate: {field}: {reason}")]
    InvalidRate { field: String, reason: String },

    /// Bands not strictly increasing, empty, or not ending in an unbounded band.
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Invalid allocation: {0}")]
    InvalidAllocation(String),

    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for UkFinanceError {
    fn from(e: serde_json::Error) -> Self {
        UkFinanceError::SerializationError(e.to_string())
    }
}
