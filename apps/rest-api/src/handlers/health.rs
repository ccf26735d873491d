//! Health endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::AppState;

/// Liveness response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

/// GET /health - liveness with a database ping.
pub async fn health(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    state.db.health_check().await?;
    Ok(Json(HealthResponse {
        status: "ok",
        database: "up",
    }))
}
