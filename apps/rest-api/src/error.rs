//! Error types for the REST API.
//!
//! ## Error Flow
//! ```text
//! CoreError / DbError ──► ApiError ──► HTTP response
//!                                       status from the domain class,
//!                                       body {"error","code","details"?}
//! ```
//!
//! Internal failures are logged with their detail and masked in the body;
//! clients only ever see the stable envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use ateneo_core::CoreError;
use ateneo_db::DbError;

/// The JSON error envelope every endpoint emits on failure.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

/// HTTP-facing error, a thin wrapper over the domain taxonomy.
#[derive(Debug)]
pub struct ApiError(CoreError);

impl ApiError {
    /// Creates a BadRequest response error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError(CoreError::bad_request(message))
    }

    fn body(&self) -> ErrorBody {
        let message = match &self.0 {
            // Internal detail stays in the logs.
            CoreError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        ErrorBody {
            error: message,
            code: self.0.code(),
            details: self.0.details().map(|d| d.to_vec()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError(err)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        ApiError(err.into_core())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(detail = %self.0, "Request failed with internal error");
        }

        (status, Json(self.body())).into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
