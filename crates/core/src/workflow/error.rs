//! Workflow error types for the transaction lifecycle.

use thiserror::Error;
use uuid::Uuid;

use crate::workflow::types::{TransactionStatus, Transition};

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The transition is not enabled for the transaction's current state.
    #[error("Transition '{transition}' is not allowed from status '{status}'")]
    InvalidTransition {
        /// The attempted transition.
        transition: Transition,
        /// The current status.
        status: TransactionStatus,
        /// Why it is blocked.
        blockers: Vec<String>,
    },

    /// No transition with this name exists.
    #[error("Unknown transition '{0}'")]
    UnknownTransition(String),

    /// The status or version changed between read and write.
    #[error("Transaction {transaction_id} was modified concurrently (expected status '{expected}')")]
    ConcurrentModification {
        /// The contested transaction.
        transaction_id: Uuid,
        /// Status the losing writer validated against.
        expected: TransactionStatus,
    },

    /// Transaction not found (or soft-deleted).
    #[error("Transaction {0} not found")]
    TransactionNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl WorkflowError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition { .. } => 422,
            Self::UnknownTransition(_) | Self::TransactionNotFound(_) => 404,
            Self::ConcurrentModification { .. } => 409,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::UnknownTransition(_) => "UNKNOWN_TRANSITION",
            Self::ConcurrentModification { .. } => "CONCURRENT_MODIFICATION",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
