//! # Error Types
//!
//! Domain-specific error types for hoffman-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  hoffman-core errors (this file)                                       │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── ValidationError  - Form field / payload validation failures       │
//! │  ├── BackendError     - What the persistence boundary may return       │
//! │  └── BookingError     - Structured record kept in the draft's          │
//! │                         `lastError` (serializable, timestamped)         │
//! │                                                                         │
//! │  hoffman-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  hoffman-store errors (separate crate)                                 │
//! │  └── StoreError       - What submit_booking hands to the caller        │
//! │                                                                         │
//! │  Flow: DbError → BackendError → BookingError(SUBMISSION_FAILED)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Core Error
// =============================================================================

/// Core booking logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Service id is not part of the catalog or the draft.
    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    /// Time slot label is not one of the offered slots.
    #[error("Unknown time slot: '{0}'")]
    UnknownTimeSlot(String),

    /// Photo is not a supported image data-URI or its payload is corrupt.
    ///
    /// ## When This Occurs
    /// - Value does not start with `data:image/...;base64,`
    /// - Image type is outside png/jpg/jpeg/gif/webp
    /// - Base64 payload fails to decode
    #[error("Invalid photo: {0}")]
    InvalidPhoto(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// The contact form rule table produces one of these per failing field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be no more than {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format. The reason is the user-facing message from the rule table.
    #[error("{reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Returns the field this error refers to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::MustBeNonNegative { field }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

// =============================================================================
// Backend Error
// =============================================================================

/// Errors the persistence boundary may return from `create_booking`.
///
/// The draft store does not branch on these: every variant becomes a
/// `SUBMISSION_FAILED` [`BookingError`] carrying the display message.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// Payload rejected by the boundary's own validation.
    #[error("{0}")]
    Validation(String),

    /// Boundary is missing required configuration.
    #[error("Missing required configuration: {0}")]
    Configuration(String),

    /// Document or file storage failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Network failure talking to a hosted service.
    #[error("Network error: {0}. Please check your internet connection and try again.")]
    Network(String),

    /// Referenced booking or photo does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Anything else.
    #[error("{0}")]
    Internal(String),
}

// =============================================================================
// Booking Error (structured record)
// =============================================================================

/// Machine-readable error codes carried by [`BookingError`].
///
/// ## Usage in Frontend
/// ```typescript
/// switch (store.lastError?.code) {
///   case 'MISSING_CONTACT': router.push('/book/contact'); break;
///   case 'SUBMISSION_FAILED': showRetry(); break;
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No contact info on the draft.
    MissingContact,
    /// No services selected.
    NoServices,
    /// No arrival window chosen.
    MissingArrivalWindow,
    /// A contact form field failed its rule.
    InvalidField,
    /// Aggregate validation failed during submission.
    ValidationFailed,
    /// The persistence boundary rejected or failed the submission.
    SubmissionFailed,
}

impl ErrorCode {
    /// Returns the wire spelling of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MissingContact => "MISSING_CONTACT",
            ErrorCode::NoServices => "NO_SERVICES",
            ErrorCode::MissingArrivalWindow => "MISSING_ARRIVAL_WINDOW",
            ErrorCode::InvalidField => "INVALID_FIELD",
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::SubmissionFailed => "SUBMISSION_FAILED",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured, timestamped booking error.
///
/// This is what `lastError` holds and what validation reports list:
/// ```json
/// {
///   "code": "NO_SERVICES",
///   "message": "Add at least one service",
///   "field": "services",
///   "timestamp": "2024-06-01T10:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BookingError {
    /// Machine-readable error code.
    pub code: ErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Field the error is scoped to, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// When the error was recorded.
    #[serde(with = "crate::types::timestamp")]
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

impl BookingError {
    /// Creates an error with no field scope.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        BookingError {
            code,
            message: message.into(),
            field: None,
            timestamp: Utc::now(),
        }
    }

    /// Creates an error scoped to a field.
    pub fn for_field(code: ErrorCode, message: impl Into<String>, field: impl Into<String>) -> Self {
        BookingError {
            code,
            message: message.into(),
            field: Some(field.into()),
            timestamp: Utc::now(),
        }
    }

    /// Wraps a boundary failure as `SUBMISSION_FAILED`.
    ///
    /// The underlying message is passed through; an empty one falls back
    /// to a generic message.
    pub fn submission_failed(err: &BackendError) -> Self {
        let message = err.to_string();
        let message = if message.trim().is_empty() {
            "Unknown error".to_string()
        } else {
            message
        };
        BookingError::new(ErrorCode::SubmissionFailed, message)
    }
}

impl From<&ValidationError> for BookingError {
    fn from(err: &ValidationError) -> Self {
        BookingError::for_field(ErrorCode::InvalidField, err.to_string(), err.field())
    }
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
