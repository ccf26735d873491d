//! Book endpoints: registration with copies, search, availability.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use ateneo_db::{BookAvailability, BookWithCopies, NewBookRequest};

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

/// Query parameters for `GET /book`.
#[derive(Debug, Deserialize)]
pub struct BookSearchParams {
    pub search: Option<String>,
}

/// POST /book - register a book and batch-create its copies.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewBookRequest>,
) -> ApiResult<(StatusCode, Json<BookWithCopies>)> {
    let book = state.db.books().register_with_copies(&payload).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// GET /book?search= - title substring or exact ISBN, with copies.
pub async fn search(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<BookSearchParams>,
) -> ApiResult<Json<Vec<BookWithCopies>>> {
    let books = state
        .db
        .books()
        .search(params.search.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(books))
}

/// GET /book/{id}/availability - copy counts for one book.
pub async fn availability(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<BookAvailability>> {
    let counts = state.db.books().availability(id).await?;
    Ok(Json(counts))
}
