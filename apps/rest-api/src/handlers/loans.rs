//! Loan endpoints: register, return, debt payment, active listing.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use ateneo_core::types::Debt;
use ateneo_db::{
    ActiveLoanPage, ActiveLoanQuery, LoanView, NewLoanRequest, ReturnOutcome, ReturnRequest,
};

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

/// Query parameters for `GET /loan/active`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveLoanParams {
    pub member_id: Option<i32>,
    pub librarian_id: Option<i32>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /loan - loan one copy to one member.
pub async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewLoanRequest>,
) -> ApiResult<(StatusCode, Json<LoanView>)> {
    let loan = state.db.loans().loan_book(&payload).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// POST /loan/{id}/return - close a loan, optionally creating a debt.
///
/// The body is optional; an absent or empty body means an undamaged
/// return.
pub async fn return_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    body: Bytes,
) -> ApiResult<Json<ReturnOutcome>> {
    let request: ReturnRequest = if body.is_empty() {
        ReturnRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {e}")))?
    };
    let outcome = state.db.loans().return_book(id, &request).await?;
    Ok(Json(outcome))
}

/// POST /loan/{id}/payDebt - settle one debt (idempotent).
pub async fn pay_debt(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Debt>> {
    let debt = state.db.debts().pay(id).await?;
    Ok(Json(debt))
}

/// GET /loan/active - open loans, newest first.
pub async fn list_active(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ActiveLoanParams>,
) -> ApiResult<Json<ActiveLoanPage>> {
    let query = ActiveLoanQuery {
        member_id: params.member_id,
        librarian_id: params.librarian_id,
        limit: params.limit,
        offset: params.offset,
    };
    let page = state.db.loans().list_active(&query).await?;
    Ok(Json(page))
}
