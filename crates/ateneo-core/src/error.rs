//! # Error Types
//!
//! Domain-specific error types for ateneo-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ateneo-core errors (this file)                                         │
//! │  └── CoreError        - Business rule violations, one HTTP class each   │
//! │                                                                         │
//! │  ateneo-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  rest-api errors (in app)                                               │
//! │  └── ApiError         - What HTTP clients see (serialized JSON)         │
//! │                                                                         │
//! │  Flow: CoreError → DbError → ApiError → { "error", "code", "details" }  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Errors are enum variants, never bare Strings
//! 3. Each variant maps to exactly one HTTP status and stable code
//! 4. Internal failure details never reach the client message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every fallible operation in the workspace ultimately surfaces one of
/// these five classes. The HTTP layer only needs [`CoreError::status`] and
/// [`CoreError::code`] to build its response envelope.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input is malformed or semantically invalid.
    ///
    /// ## When This Occurs
    /// - An enum discriminant outside the closed set (kind 9, role 3)
    /// - A date string that is not strict ISO-8601 UTC
    /// - Loan requester is not a member, or approver not a librarian
    #[error("{0}")]
    BadRequest(String),

    /// Aggregated field-level validation failures.
    ///
    /// Validation never stops at the first bad field; every failing check
    /// contributes one message so the client can fix the whole payload in
    /// one round trip.
    #[error("Validation failed: {}", messages.join("; "))]
    Validation { messages: Vec<String> },

    /// A referenced entity does not exist (or is soft-deleted).
    #[error("{0}")]
    NotFound(String),

    /// The operation conflicts with current state.
    ///
    /// ## When This Occurs
    /// - Loaning a copy that already has an open loan
    /// - Returning a loan that was already returned
    #[error("{0}")]
    Conflict(String),

    /// Unexpected failure. The message is safe to show; the cause is not.
    #[error("{0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::BadRequest`].
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Shorthand for [`CoreError::Validation`].
    pub fn validation(messages: Vec<String>) -> Self {
        Self::Validation { messages }
    }

    /// Shorthand for [`CoreError::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Shorthand for [`CoreError::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Shorthand for [`CoreError::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status this error class maps to.
    pub fn status(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::Validation { .. } => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
        }
    }

    /// Stable machine-readable code for the response envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Per-field messages, present only for the validation class.
    pub fn details(&self) -> Option<&[String]> {
        match self {
            Self::Validation { messages } => Some(messages),
            _ => None,
        }
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
