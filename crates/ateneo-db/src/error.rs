//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  PostgreSQL Error (sqlx::Error)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Constraint violations become domain errors    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (in rest-api) ← Mapped to HTTP status + JSON body            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Client receives {"error", "code", "details"?}                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Constraint Translation
//! Unique violations are recognized by the driver's structured error kind
//! and the violated constraint NAME, never by matching message text. The
//! partial index `ux_loan_copy_active` is the one that matters most: it is
//! the authoritative guard for "at most one active loan per copy", and the
//! losing side of that race must surface as a domain Conflict.

use sqlx::error::ErrorKind;
use thiserror::Error;

use ateneo_core::CoreError;

/// Database operation errors.
///
/// Domain outcomes (not found, conflict, validation) travel as
/// [`DbError::Domain`]; everything else is infrastructure trouble that the
/// HTTP layer masks as an internal error.
#[derive(Debug, Error)]
pub enum DbError {
    /// A domain-level outcome: not found, conflict, bad request, validation.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a domain NotFound.
    pub fn not_found(message: impl Into<String>) -> Self {
        DbError::Domain(CoreError::not_found(message))
    }

    /// Creates a domain Conflict.
    pub fn conflict(message: impl Into<String>) -> Self {
        DbError::Domain(CoreError::conflict(message))
    }

    /// Creates a domain BadRequest.
    pub fn bad_request(message: impl Into<String>) -> Self {
        DbError::Domain(CoreError::bad_request(message))
    }

    /// Flattens into the domain taxonomy for the HTTP layer.
    ///
    /// Infrastructure failures collapse into `CoreError::Internal`; their
    /// detail is kept in the message for logging, and the HTTP layer is
    /// responsible for not leaking it to clients.
    pub fn into_core(self) -> CoreError {
        match self {
            DbError::Domain(err) => err,
            other => CoreError::internal(other.to_string()),
        }
    }
}

impl From<DbError> for CoreError {
    fn from(err: DbError) -> Self {
        err.into_core()
    }
}

/// Maps a violated unique constraint to its domain meaning.
///
/// Keyed on constraint names from the schema migrations. Messages match
/// the fast-path checks in the repositories so callers cannot tell which
/// side of the race they lost on.
fn unique_violation(constraint: Option<&str>) -> CoreError {
    match constraint {
        Some("ux_loan_copy_active") => CoreError::conflict("Copy is already on loan"),
        Some("person_dni_key") => {
            CoreError::conflict("A person with the provided dni already exists")
        }
        Some("book_isbn_key") => CoreError::conflict("A book with that ISBN already exists"),
        Some("payment_name_key") => {
            CoreError::conflict("A payment method with that name already exists")
        }
        Some("ux_person_member_id") | Some("ux_person_enrollment_librarian") => {
            CoreError::conflict("Generated person code is already taken, retry the request")
        }
        Some(name) => CoreError::conflict(format!("Duplicate value violates {name}")),
        None => CoreError::conflict("Duplicate value"),
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound            → Domain NotFound
/// sqlx::Error::Database (unique)      → Domain Conflict, by constraint name
/// sqlx::Error::Database (foreign key) → Domain Conflict
/// sqlx::Error::PoolTimedOut           → PoolExhausted
/// Other                               → Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record not found"),

            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation => {
                    DbError::Domain(unique_violation(db_err.constraint()))
                }
                ErrorKind::ForeignKeyViolation => {
                    DbError::conflict("Operation conflicts with related records")
                }
                _ => DbError::QueryFailed(db_err.message().to_string()),
            },

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
