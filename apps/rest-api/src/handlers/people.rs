//! Person endpoints: registration, listings, member debts.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use ateneo_core::types::Person;
use ateneo_db::{MemberDebtView, NewPersonRequest};

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

/// Query parameters for `GET /person/{id}/debts`.
#[derive(Debug, Deserialize)]
pub struct DebtParams {
    /// Defaults to true: the everyday view is "what does this member owe".
    #[serde(rename = "onlyUnpaid")]
    pub only_unpaid: Option<bool>,
}

/// POST /person/member - register a member with a generated S-code.
pub async fn register_member(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewPersonRequest>,
) -> ApiResult<(StatusCode, Json<Person>)> {
    let person = state.db.people().register_member(&payload).await?;
    Ok((StatusCode::CREATED, Json(person)))
}

/// POST /person/librarian - register a librarian with a generated B-code.
pub async fn register_librarian(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewPersonRequest>,
) -> ApiResult<(StatusCode, Json<Person>)> {
    let person = state.db.people().register_librarian(&payload).await?;
    Ok((StatusCode::CREATED, Json(person)))
}

/// GET /person/members - all members, id ascending.
pub async fn list_members(State(state): State<AppState>) -> ApiResult<Json<Vec<Person>>> {
    let members = state.db.people().list_members().await?;
    Ok(Json(members))
}

/// GET /person/librarians - all librarians, id ascending.
pub async fn list_librarians(State(state): State<AppState>) -> ApiResult<Json<Vec<Person>>> {
    let librarians = state.db.people().list_librarians().await?;
    Ok(Json(librarians))
}

/// GET /person/{id}/debts - a member's debts with book context.
pub async fn member_debts(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ApiQuery(params): ApiQuery<DebtParams>,
) -> ApiResult<Json<Vec<MemberDebtView>>> {
    // Resolve the person first so an absent id is a 404 and a
    // non-member id a 400, never just an empty list.
    state.db.people().get_member(id).await?;

    let debts = state
        .db
        .debts()
        .list_for_member(id, params.only_unpaid.unwrap_or(true))
        .await?;
    Ok(Json(debts))
}
