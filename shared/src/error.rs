//! Error kinds raised by the feed-request workflow

use thiserror::Error;

/// Outcome of a rejected workflow operation
///
/// The HTTP layer maps each kind to its own status code; see the backend's
/// `AppError`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// A referenced entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Status guard violated: request already processed, farmer inactive
    #[error("{0}")]
    InvalidState(String),

    /// Not enough bags on hand; `available` is echoed to the client
    #[error("Insufficient stock. Only {available} bags available")]
    InsufficientStock { available: i32, requested: i32 },

    /// A row referenced by a stored request has disappeared
    #[error("Integrity violation: {0}")]
    IntegrityViolation(String),

    /// Bag quantity outside the accepted range
    #[error("Quantity must be at least 1 bag, got {0}")]
    InvalidQuantity(i32),
}

impl WorkflowError {
    /// Short machine-readable code for client responses
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::NotFound(_) => "NOT_FOUND",
            WorkflowError::InvalidState(_) => "INVALID_STATE",
            WorkflowError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            WorkflowError::IntegrityViolation(_) => "INTEGRITY_VIOLATION",
            WorkflowError::InvalidQuantity(_) => "VALIDATION_ERROR",
        }
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
