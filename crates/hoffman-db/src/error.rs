//! # Database Errors
//!
//! ```text
//! sqlx::Error ──► DbError ──► BackendError ──► BookingError { SUBMISSION_FAILED }
//!                 (here)      (create_booking)  (draft lastError)
//! ```
//!
//! Admin operations surface `DbError` through `BackendError` as well, so a
//! missing booking stays distinguishable from a storage fault.

use hoffman_core::BackendError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// No row for the given id.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The database file could not be opened or created, or the pool is closed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite rejected the statement, e.g. a constraint violation.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A stored column could not be decoded (bad JSON, unknown status, ...).
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    /// No connection freed up within the acquire timeout.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),
            sqlx::Error::Database(db_err) => DbError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),
            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::InvalidData(err.to_string())
    }
}

/// Maps storage failures onto the persistence boundary's error type.
impl From<DbError> for BackendError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => BackendError::NotFound { entity, id },
            other => BackendError::Storage(other.to_string()),
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_backend_error_mapping() {
        let err: BackendError = DbError::not_found("Booking", "b-1").into();
        assert_eq!(err.to_string(), "Booking not found: b-1");

        let err: BackendError = DbError::PoolExhausted.into();
        assert_eq!(err.to_string(), "Storage error: Connection pool exhausted");
    }
}
