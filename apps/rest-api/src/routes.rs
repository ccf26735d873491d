//! Route table.
//!
//! ```text
//! POST   /sales                    run the transaction pipeline
//! GET    /sales                    filtered, paginated listing
//! GET    /sales/{id}               one hydrated sale
//! POST   /loan                     loan a copy to a member
//! GET    /loan/active              open loans
//! POST   /loan/{id}/return         close a loan (id = loan)
//! POST   /loan/{id}/payDebt        settle a debt (id = debt)
//! POST   /person/member            register a member
//! POST   /person/librarian         register a librarian
//! GET    /person/members           list members
//! GET    /person/librarians        list librarians
//! GET    /person/{id}/debts        a member's debts
//! POST   /book                     register a book with copies
//! GET    /book?search=             search books
//! GET    /book/{id}/availability   copy counts
//! GET    /products                 product registry
//! POST   /products
//! GET    /products/{id}
//! DELETE /products/{id}            soft delete
//! GET    /payments                 payment methods
//! GET    /health                   liveness + DB ping
//! ```

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the full application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/sales",
            post(handlers::sales::create).get(handlers::sales::list),
        )
        .route("/sales/{id}", get(handlers::sales::get_by_id))
        .route("/loan", post(handlers::loans::create))
        .route("/loan/active", get(handlers::loans::list_active))
        .route("/loan/{id}/return", post(handlers::loans::return_book))
        .route("/loan/{id}/payDebt", post(handlers::loans::pay_debt))
        .route("/person/member", post(handlers::people::register_member))
        .route(
            "/person/librarian",
            post(handlers::people::register_librarian),
        )
        .route("/person/members", get(handlers::people::list_members))
        .route("/person/librarians", get(handlers::people::list_librarians))
        .route("/person/{id}/debts", get(handlers::people::member_debts))
        .route(
            "/book",
            post(handlers::books::register).get(handlers::books::search),
        )
        .route("/book/{id}/availability", get(handlers::books::availability))
        .route(
            "/products",
            get(handlers::products::list).post(handlers::products::create),
        )
        .route(
            "/products/{id}",
            get(handlers::products::get_by_id).delete(handlers::products::soft_delete),
        )
        .route("/payments", get(handlers::payments::list))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
