//! Product registry endpoints.
//!
//! Stock is read-only here: it moves only through the sale pipeline.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use ateneo_core::types::Product;
use ateneo_db::NewProductRequest;

use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

/// GET /products - all non-deleted products.
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    let products = state.db.products().list().await?;
    Ok(Json(products))
}

/// GET /products/{id} - one product.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Product>> {
    let product = state.db.products().get_by_id(id).await?;
    Ok(Json(product))
}

/// POST /products - register a product.
pub async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewProductRequest>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = state.db.products().create(&payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// DELETE /products/{id} - soft delete; history keeps referencing it.
pub async fn soft_delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    state.db.products().soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
