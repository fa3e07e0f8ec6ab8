//! # Database Error Types
//!
//! Every repository operation returns [`DbError`], and every `DbError`
//! belongs to exactly one [`ErrorClass`].
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  ValidationError (ilm-core)        sqlx::Error                          │
//! │       │                                 │                               │
//! │       ▼                                 ▼                               │
//! │  DbError::Validation            DbError::{UniqueViolation, QueryFailed, │
//! │  DbError::NotFound                 ConnectionFailed, Transaction…}      │
//! │       │                                 │                               │
//! │       ▼                                 ▼                               │
//! │  ErrorClass::BadRequest         ErrorClass::Internal                    │
//! │       │                                 │                               │
//! │       └──────────────┬──────────────────┘                               │
//! │                      ▼                                                  │
//! │  Caller maps the class to a status code / exit code                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage variants keep the original `sqlx::Error` as their source, so
//! `std::error::Error::source()` always reaches the root cause.

use ilm_core::ValidationError;
use thiserror::Error;

// =============================================================================
// Classification
// =============================================================================

/// Caller-facing classification of a [`DbError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The request is malformed or refers to a row that does not exist.
    /// Retrying without changing the request will not help.
    BadRequest,

    /// The store or the transaction machinery failed.
    Internal,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::BadRequest => "bad_request",
            ErrorClass::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// DbError
// =============================================================================

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Input rejected before any statement was issued.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Update or delete precondition: the row does not exist.
    ///
    /// Plain lookups report a missing row as `Ok(None)` instead.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Second `InstitutionDetails` row for the same institution and language
    /// - Duplicate employee `unique_id`, user email or refresh token
    #[error("Duplicate value for {field}")]
    UniqueViolation {
        field: String,
        #[source]
        source: sqlx::Error,
    },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Child record referencing an institution or employee that does not exist
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation {
        message: String,
        #[source]
        source: sqlx::Error,
    },

    /// Database connection failed or the pool is closed.
    #[error("Connection failed")]
    ConnectionFailed(#[source] sqlx::Error),

    /// Migration failed.
    #[error("Migration failed")]
    MigrationFailed(#[from] sqlx::migrate::MigrateError),

    /// Statement rejected by SQLite for any other reason.
    #[error("Query failed")]
    QueryFailed(#[source] sqlx::Error),

    /// Begin or commit failed. A failed commit voids the unit of work.
    #[error("Transaction {stage} failed")]
    TransactionFailed {
        stage: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// The unit of work failed and the rollback failed too.
    #[error("{cause}; rollback also failed")]
    RollbackFailed {
        cause: Box<DbError>,
        #[source]
        source: sqlx::Error,
    },

    /// Pool exhausted (all connections in use until the acquire timeout).
    #[error("Connection pool exhausted")]
    PoolExhausted(#[source] sqlx::Error),

    /// Internal database error.
    #[error("Internal database error")]
    Internal(#[source] sqlx::Error),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        DbError::NotFound { entity, id }
    }

    /// Classifies the error for the caller.
    ///
    /// ```text
    /// Validation, NotFound   → BadRequest
    /// everything else        → Internal
    /// ```
    pub fn class(&self) -> ErrorClass {
        match self {
            DbError::Validation(_) | DbError::NotFound { .. } => ErrorClass::BadRequest,
            _ => ErrorClass::Internal,
        }
    }

    /// Shorthand for `class() == ErrorClass::BadRequest`.
    pub fn is_bad_request(&self) -> bool {
        self.class() == ErrorClass::BadRequest
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::PoolClosed/Io  → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
///
/// `RowNotFound` stays `Internal`. Repositories use `fetch_optional` and
/// raise `NotFound` themselves where absence is a caller fault.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        let message = err
            .as_database_error()
            .map(|db_err| db_err.message().to_string());

        if let Some(message) = message {
            // SQLite constraint messages:
            // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
            // FK constraint: "FOREIGN KEY constraint failed"
            if let Some(field) = message.strip_prefix("UNIQUE constraint failed: ") {
                return DbError::UniqueViolation {
                    field: field.to_string(),
                    source: err,
                };
            }
            if message.contains("FOREIGN KEY constraint failed") {
                return DbError::ForeignKeyViolation {
                    message,
                    source: err,
                };
            }
            return DbError::QueryFailed(err);
        }

        match err {
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted(err),
            sqlx::Error::PoolClosed | sqlx::Error::Io(_) => DbError::ConnectionFailed(err),
            _ => DbError::Internal(err),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_caller_faults_are_bad_request() {
        let err: DbError = ValidationError::must_be_positive("id", 0).into();
        assert_eq!(err.class(), ErrorClass::BadRequest);
        assert_eq!(err.to_string(), "id must be positive, got 0");

        let err = DbError::not_found("InstitutionAchievement", 999);
        assert!(err.is_bad_request());
        assert_eq!(err.to_string(), "InstitutionAchievement not found: 999");
    }

    #[test]
    fn test_storage_faults_are_internal_and_keep_cause() {
        let err = DbError::from(sqlx::Error::PoolClosed);
        assert!(matches!(err, DbError::ConnectionFailed(_)));
        assert_eq!(err.class(), ErrorClass::Internal);
        assert!(err.source().is_some());

        let err = DbError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, DbError::PoolExhausted(_)));

        let err = DbError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.class(), ErrorClass::Internal);
    }

    #[test]
    fn test_storage_messages_leave_cause_to_the_chain() {
        let err = DbError::from(sqlx::Error::PoolClosed);
        assert_eq!(err.to_string(), "Connection failed");
        let cause = err.source().unwrap().to_string();
        assert!(!cause.is_empty());

        let err = DbError::TransactionFailed {
            stage: "commit",
            source: sqlx::Error::PoolClosed,
        };
        assert_eq!(err.to_string(), "Transaction commit failed");
        assert_eq!(err.source().unwrap().to_string(), cause);

        for err in [
            DbError::QueryFailed(sqlx::Error::PoolClosed),
            DbError::Internal(sqlx::Error::PoolClosed),
        ] {
            assert!(!err.to_string().contains(&cause));
            assert!(err.source().is_some());
        }
    }

    #[test]
    fn test_rollback_failure_reports_both() {
        let err = DbError::RollbackFailed {
            cause: Box::new(DbError::not_found("InstitutionProjectPartner", 4)),
            source: sqlx::Error::PoolClosed,
        };
        let msg = err.to_string();
        assert!(msg.contains("InstitutionProjectPartner not found: 4"));
        assert!(msg.contains("rollback also failed"));
        assert!(err.source().is_some());
        assert_eq!(err.class(), ErrorClass::Internal);
    }
}
