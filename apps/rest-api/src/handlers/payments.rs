//! Payment method endpoints.

use axum::extract::State;
use axum::Json;

use ateneo_core::types::Payment;

use crate::error::ApiResult;
use crate::state::AppState;

/// GET /payments - active payment methods.
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Payment>>> {
    let payments = state.db.payments().list_active().await?;
    Ok(Json(payments))
}
