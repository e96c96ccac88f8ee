//! # Store Errors
//!
//! What the draft store hands back to callers.
//!
//! Mutators never fail: they silently ignore invalid input. Only
//! submission and the persistence plumbing produce a [`StoreError`].

use hoffman_core::{BackendError, BookingError};
use thiserror::Error;

/// Draft store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The draft failed aggregate validation; nothing was sent.
    ///
    /// `message` is every error message joined with `", "`.
    #[error("{message}")]
    Validation {
        message: String,
        errors: Vec<BookingError>,
    },

    /// Another submission from this store is still in flight.
    #[error("A booking submission is already in progress")]
    SubmissionInProgress,

    /// The persistence boundary failed. `error` is the record kept in
    /// `lastError`.
    #[error("{}", .error.message)]
    Submission {
        error: BookingError,
        #[source]
        source: BackendError,
    },

    /// Draft storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// The structured record for this failure, when there is one.
    pub fn booking_error(&self) -> Option<&BookingError> {
        match self {
            StoreError::Submission { error, .. } => Some(error),
            StoreError::Validation { errors, .. } => errors.first(),
            _ => None,
        }
    }
}

/// Convenience type alias for Results with StoreError.
pub type StoreResult<T> = Result<T, StoreError>;
