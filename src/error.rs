//! Error types for monitor creation.

use thiserror::Error;

/// A broken calling contract.
///
/// These are programmer errors, not environmental failures: a caller that
/// respects the API never sees them.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("Attempted to observe objects from {stack} outside the coordinating context.")]
    WrongContext { stack: String },

    #[error("A list monitor requires an OrderBy clause.")]
    MissingOrderBy,
}

/// Main error type for monitor operations.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Contract violation: {0}")]
    Contract(#[from] ContractViolation),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl MonitorError {
    /// True if this error is a calling-contract violation.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, MonitorError::Contract(_))
    }
}

impl From<serde_json::Error> for MonitorError {
    fn from(e: serde_json::Error) -> Self {
        MonitorError::Serialization(e.to_string())
    }
}

/// Result type for monitor operations.
pub type Result<T> = std::result::Result<T, MonitorError>;
