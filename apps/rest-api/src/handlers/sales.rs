//! Sale endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use ateneo_core::pipeline::SaleRequest;
use ateneo_db::{SaleListQuery, SalePage, SaleView};

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

/// Query parameters for `GET /sales`.
#[derive(Debug, Deserialize)]
pub struct SaleListParams {
    pub page: Option<i64>,
    /// Positive integer or `all`.
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
    pub payment_id: Option<i32>,
    /// Comma-separated kind ids.
    pub kind_id: Option<String>,
    /// Comma-separated state ids.
    pub state_id: Option<String>,
    /// One UTC day; exclusive with the range.
    pub day: Option<String>,
    #[serde(rename = "dateFrom")]
    pub date_from: Option<String>,
    #[serde(rename = "dateTo")]
    pub date_to: Option<String>,
}

impl From<SaleListParams> for SaleListQuery {
    fn from(params: SaleListParams) -> Self {
        SaleListQuery {
            page: params.page,
            page_size: params.page_size,
            payment_id: params.payment_id,
            kind_id: params.kind_id,
            state_id: params.state_id,
            day: params.day,
            date_from: params.date_from,
            date_to: params.date_to,
        }
    }
}

/// POST /sales - run the transaction pipeline.
pub async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SaleRequest>,
) -> ApiResult<(StatusCode, Json<SaleView>)> {
    let sale = state.db.sales().create(&payload).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// GET /sales - filtered, paginated listing.
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SaleListParams>,
) -> ApiResult<Json<SalePage>> {
    let page = state.db.sales().list(&params.into()).await?;
    Ok(Json(page))
}

/// GET /sales/{id} - one hydrated sale with line items.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<SaleView>> {
    let sale = state.db.sales().get_by_id(id).await?;
    Ok(Json(sale))
}
