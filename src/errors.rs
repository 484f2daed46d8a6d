use thiserror::Error;

/// Message surfaced when the stored expense list cannot be read.
pub const LOAD_FAILURE_MESSAGE: &str = "Failed to load expenses";
/// Message surfaced when a new expense cannot be persisted.
pub const ADD_FAILURE_MESSAGE: &str = "Failed to add expense";
/// Message surfaced when a deletion cannot be persisted.
pub const DELETE_FAILURE_MESSAGE: &str = "Failed to delete expense";

/// Failures raised by key-value stores and the expense codec.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Error type returned by expense state operations.
///
/// The `Display` output of the operation variants is the fixed user-facing
/// message that is also mirrored into [`crate::core::ExpenseState::error`].
#[derive(Debug, Error)]
pub enum ExpenseError {
    #[error("Failed to load expenses")]
    Load(#[source] StoreError),
    #[error("Failed to add expense")]
    Add(#[source] StoreError),
    #[error("Failed to delete expense")]
    Delete(#[source] StoreError),
    #[error("{0}")]
    InvalidInput(String),
}

impl ExpenseError {
    /// Returns the underlying store failure, if any.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            ExpenseError::Load(err) | ExpenseError::Add(err) | ExpenseError::Delete(err) => {
                Some(err)
            }
            ExpenseError::InvalidInput(_) => None,
        }
    }
}
