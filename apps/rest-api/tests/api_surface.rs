//! HTTP surface tests against a real PostgreSQL database.
//!
//! These are gated on `DATABASE_URL` and marked `#[ignore]`; run them
//! explicitly when a database is available:
//!
//! ```bash
//! DATABASE_URL=postgres://localhost:5432/ateneo_test \
//!     cargo test -p ateneo-rest-api -- --ignored
//! ```
//!
//! Each test generates its own entities with unique names, so the suite
//! can run repeatedly against the same database.

use std::str::FromStr;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use ateneo_db::{Database, DbConfig};
use ateneo_rest_api::{build_router, ApiConfig, AppState};

async fn test_app() -> Option<Router> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set, skipping");
            return None;
        }
    };

    let db = Database::new(DbConfig::new(&url).max_connections(5))
        .await
        .expect("database must be reachable");

    let config = ApiConfig {
        database_url: url,
        listen_addr: "127.0.0.1:0".to_string(),
        db_max_connections: 5,
        db_run_migrations: true,
    };
    Some(build_router(AppState::new(db, config)))
}

async fn request(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).expect("serializable body"))
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).expect("valid request"))
        .await
        .expect("infallible router");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, value)
}

fn unique_suffix() -> i64 {
    chrono::Utc::now().timestamp_micros()
}

fn as_decimal(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("decimal serialized as string"))
        .expect("parseable decimal")
}

#[tokio::test]
#[ignore]
async fn health_reports_database_up() {
    let Some(app) = test_app().await else { return };

    let (status, body) = request(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "up");
}

#[tokio::test]
#[ignore]
async fn sale_decrements_stock_and_totals_match() {
    let Some(app) = test_app().await else { return };
    let suffix = unique_suffix();

    let (status, product) = request(
        &app,
        Method::POST,
        "/products",
        Some(json!({
            "name": format!("Test Notebook {suffix}"),
            "price": "5000.00",
            "stock": "10.00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let product_id = product["id"].as_i64().expect("product id");

    let (status, payments) = request(&app, Method::GET, "/payments", None).await;
    assert_eq!(status, StatusCode::OK);
    let payment_id = payments[0]["id"].as_i64().expect("seeded payment method");

    let (status, sale) = request(
        &app,
        Method::POST,
        "/sales",
        Some(json!({
            "payment_id": payment_id,
            "kind_id": 1,
            "state_id": 1,
            "items": [{"product_id": product_id, "quantity": 2, "unit_price": 5000}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "body: {sale}");
    assert_eq!(as_decimal(&sale["total"]), Decimal::from(10000));
    assert_eq!(sale["kind_name"], "Sale");
    assert_eq!(sale["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(as_decimal(&sale["items"][0]["subtotal"]), Decimal::from(10000));

    let uri = format!("/products/{product_id}");
    let (status, after) = request(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_decimal(&after["stock"]), Decimal::from(8));

    // The hydrated sale is also fetchable on its own.
    let sale_id = sale["id"].as_i64().expect("sale id");
    let (status, fetched) = request(&app, Method::GET, &format!("/sales/{sale_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], sale["id"]);
}

#[tokio::test]
#[ignore]
async fn oversell_is_rejected_with_the_product_id() {
    let Some(app) = test_app().await else { return };
    let suffix = unique_suffix();

    let (_, product) = request(
        &app,
        Method::POST,
        "/products",
        Some(json!({
            "name": format!("Scarce Item {suffix}"),
            "price": "100.00",
            "stock": "1.00"
        })),
    )
    .await;
    let product_id = product["id"].as_i64().expect("product id");

    let (_, payments) = request(&app, Method::GET, "/payments", None).await;
    let payment_id = payments[0]["id"].as_i64().expect("payment id");

    let (status, body) = request(
        &app,
        Method::POST,
        "/sales",
        Some(json!({
            "payment_id": payment_id,
            "kind_id": 1,
            "state_id": 1,
            "items": [{"product_id": product_id, "quantity": 2}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let details = body["details"].to_string();
    assert!(
        details.contains(&product_id.to_string()),
        "stock error must cite the product id: {details}"
    );
}

#[tokio::test]
#[ignore]
async fn racing_sales_do_not_lose_stock_updates() {
    let Some(app) = test_app().await else { return };
    let suffix = unique_suffix();

    let (_, product) = request(
        &app,
        Method::POST,
        "/products",
        Some(json!({
            "name": format!("Contended Item {suffix}"),
            "price": "100.00",
            "stock": "10.00"
        })),
    )
    .await;
    let product_id = product["id"].as_i64().expect("product id");

    let (_, payments) = request(&app, Method::GET, "/payments", None).await;
    let payment_id = payments[0]["id"].as_i64().expect("payment id");

    let payload = json!({
        "payment_id": payment_id,
        "kind_id": 1,
        "state_id": 1,
        "items": [{"product_id": product_id, "quantity": 3}]
    });

    let (a, b) = tokio::join!(
        request(&app, Method::POST, "/sales", Some(payload.clone())),
        request(&app, Method::POST, "/sales", Some(payload.clone()))
    );
    assert_eq!(a.0, StatusCode::CREATED, "body: {}", a.1);
    assert_eq!(b.0, StatusCode::CREATED, "body: {}", b.1);

    // Both decrements must land; a lost update would leave 7.
    let uri = format!("/products/{product_id}");
    let (_, after) = request(&app, Method::GET, &uri, None).await;
    assert_eq!(as_decimal(&after["stock"]), Decimal::from(4));
}

#[tokio::test]
#[ignore]
async fn empty_items_fail_validation_with_envelope() {
    let Some(app) = test_app().await else { return };

    let (status, body) = request(
        &app,
        Method::POST,
        "/sales",
        Some(json!({"payment_id": 1, "kind_id": 1, "state_id": 1, "items": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["details"].is_array());
}

#[tokio::test]
#[ignore]
async fn day_filter_conflicts_with_range() {
    let Some(app) = test_app().await else { return };

    let (status, body) = request(
        &app,
        Method::GET,
        "/sales?day=2026-04-01T00:00:00Z&dateFrom=2026-04-01T00:00:00Z&dateTo=2026-04-02T00:00:00Z",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
#[ignore]
async fn loan_lifecycle_with_damage_debt() {
    let Some(app) = test_app().await else { return };
    let suffix = unique_suffix();

    let (status, member) = request(
        &app,
        Method::POST,
        "/person/member",
        Some(json!({"name": "Ada", "lastname": "Test", "dni": format!("M{suffix}")})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let member_id = member["memberId"].as_str().expect("generated code");
    assert!(member_id.starts_with("S-"), "member code: {member_id}");
    let member_id = member["id"].as_i64().expect("member id");

    let (status, librarian) = request(
        &app,
        Method::POST,
        "/person/librarian",
        Some(json!({"name": "Bo", "lastname": "Test", "dni": format!("L{suffix}")})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let librarian_id = librarian["id"].as_i64().expect("librarian id");

    let (status, book) = request(
        &app,
        Method::POST,
        "/book",
        Some(json!({
            "isbn": format!("isbn-{suffix}"),
            "title": format!("Test Title {suffix}"),
            "author": "Nobody",
            "copies": 1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let copy_id = book["copies"][0]["id"].as_i64().expect("copy id");
    let book_id = book["id"].as_i64().expect("book id");

    let loan_payload = json!({
        "memberId": member_id,
        "librarianId": librarian_id,
        "copyId": copy_id,
        "dateFrom": "2026-03-01T10:00:00Z",
        "dateTo": "2026-03-15T10:00:00Z"
    });

    let (status, loan) = request(&app, Method::POST, "/loan", Some(loan_payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "body: {loan}");
    let loan_id = loan["id"].as_i64().expect("loan id");
    assert_eq!(loan["bookTitle"], book["title"]);

    // The copy shows as on loan.
    let (status, avail) =
        request(&app, Method::GET, &format!("/book/{book_id}/availability"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(avail["total"], 1);
    assert_eq!(avail["on_loan"], 1);
    assert_eq!(avail["available"], 0);

    // Same copy again: rejected while the loan is open.
    let (status, body) = request(&app, Method::POST, "/loan", Some(loan_payload.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Copy is already on loan");

    // Damaged return creates exactly one unpaid debt.
    let (status, outcome) = request(
        &app,
        Method::POST,
        &format!("/loan/{loan_id}/return"),
        Some(json!({"damaged": true, "damageAmount": "1500.00"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {outcome}");
    assert!(outcome["loan"]["returnedAt"].is_string());
    let debt = &outcome["createdDebt"];
    assert_eq!(as_decimal(&debt["amount"]), Decimal::new(150000, 2));
    assert_eq!(debt["paid"], false);
    let debt_id = debt["id"].as_i64().expect("debt id");

    // Second return is a conflict.
    let (status, body) =
        request(&app, Method::POST, &format!("/loan/{loan_id}/return"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Loan was already returned");

    // The debt shows up under the member.
    let (status, debts) =
        request(&app, Method::GET, &format!("/person/{member_id}/debts"), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = debts
        .as_array()
        .expect("debt list")
        .iter()
        .any(|d| d["id"].as_i64() == Some(debt_id));
    assert!(listed, "new debt must be listed as unpaid");

    // Paying is idempotent.
    let (status, paid) =
        request(&app, Method::POST, &format!("/loan/{debt_id}/payDebt"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["paid"], true);

    let (status, paid_again) =
        request(&app, Method::POST, &format!("/loan/{debt_id}/payDebt"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid_again["paid"], true);

    // Once paid, the default (unpaid-only) view no longer includes it.
    let (_, debts) =
        request(&app, Method::GET, &format!("/person/{member_id}/debts"), None).await;
    let still_listed = debts
        .as_array()
        .expect("debt list")
        .iter()
        .any(|d| d["id"].as_i64() == Some(debt_id));
    assert!(!still_listed, "paid debt must drop out of the unpaid view");

    // With onlyUnpaid=false it reappears.
    let (_, debts) = request(
        &app,
        Method::GET,
        &format!("/person/{member_id}/debts?onlyUnpaid=false"),
        None,
    )
    .await;
    let in_history = debts
        .as_array()
        .expect("debt list")
        .iter()
        .any(|d| d["id"].as_i64() == Some(debt_id));
    assert!(in_history, "paid debt must stay in the full history");
}

#[tokio::test]
#[ignore]
async fn racing_loans_on_one_copy_yield_one_winner() {
    let Some(app) = test_app().await else { return };
    let suffix = unique_suffix();

    let (_, member) = request(
        &app,
        Method::POST,
        "/person/member",
        Some(json!({"name": "Race", "lastname": "One", "dni": format!("R{suffix}")})),
    )
    .await;
    let member_id = member["id"].as_i64().expect("member id");

    let (_, librarian) = request(
        &app,
        Method::POST,
        "/person/librarian",
        Some(json!({"name": "Race", "lastname": "Two", "dni": format!("Q{suffix}")})),
    )
    .await;
    let librarian_id = librarian["id"].as_i64().expect("librarian id");

    let (_, book) = request(
        &app,
        Method::POST,
        "/book",
        Some(json!({
            "isbn": format!("race-{suffix}"),
            "title": "Contended Copy",
            "author": "Nobody",
            "copies": 1
        })),
    )
    .await;
    let copy_id = book["copies"][0]["id"].as_i64().expect("copy id");

    let payload = json!({
        "memberId": member_id,
        "librarianId": librarian_id,
        "copyId": copy_id,
        "dateFrom": "2026-03-01T10:00:00Z",
        "dateTo": "2026-03-15T10:00:00Z"
    });

    let (a, b) = tokio::join!(
        request(&app, Method::POST, "/loan", Some(payload.clone())),
        request(&app, Method::POST, "/loan", Some(payload.clone()))
    );

    let mut statuses = [a.0, b.0];
    statuses.sort();
    assert_eq!(
        statuses,
        [StatusCode::CREATED, StatusCode::CONFLICT],
        "exactly one racing request may win: {} / {}",
        a.1,
        b.1
    );
}

#[tokio::test]
#[ignore]
async fn member_role_is_enforced_on_loans() {
    let Some(app) = test_app().await else { return };
    let suffix = unique_suffix();

    // A librarian cannot borrow: the memberId slot demands the member role.
    let (_, librarian) = request(
        &app,
        Method::POST,
        "/person/librarian",
        Some(json!({"name": "Only", "lastname": "Staff", "dni": format!("S{suffix}")})),
    )
    .await;
    let librarian_id = librarian["id"].as_i64().expect("librarian id");

    let (_, book) = request(
        &app,
        Method::POST,
        "/book",
        Some(json!({
            "isbn": format!("role-{suffix}"),
            "title": "Role Check",
            "author": "Nobody",
            "copies": 1
        })),
    )
    .await;
    let copy_id = book["copies"][0]["id"].as_i64().expect("copy id");

    let (status, body) = request(
        &app,
        Method::POST,
        "/loan",
        Some(json!({
            "memberId": librarian_id,
            "librarianId": librarian_id,
            "copyId": copy_id,
            "dateFrom": "2026-03-01T10:00:00Z",
            "dateTo": "2026-03-15T10:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
#[ignore]
async fn duplicate_dni_conflicts() {
    let Some(app) = test_app().await else { return };
    let suffix = unique_suffix();

    let payload = json!({"name": "Dup", "lastname": "Dni", "dni": format!("D{suffix}")});
    let (status, _) = request(&app, Method::POST, "/person/member", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = request(&app, Method::POST, "/person/member", Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
#[ignore]
async fn book_search_finds_by_exact_isbn() {
    let Some(app) = test_app().await else { return };
    let suffix = unique_suffix();
    let isbn = format!("find-{suffix}");

    let (status, created) = request(
        &app,
        Method::POST,
        "/book",
        Some(json!({
            "isbn": isbn,
            "title": format!("Searchable {suffix}"),
            "author": "Nobody",
            "copies": 2
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["copies"].as_array().map(Vec::len), Some(2));

    let (status, found) =
        request(&app, Method::GET, &format!("/book?search={isbn}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let hits = found.as_array().expect("book list");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["isbn"], created["isbn"]);
    assert_eq!(hits[0]["copies"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
#[ignore]
async fn malformed_json_gets_the_envelope() {
    let Some(app) = test_app().await else { return };

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/sales")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .expect("valid request"),
        )
        .await
        .expect("infallible router");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    let body: Value = serde_json::from_slice(&bytes).expect("enveloped error");
    assert_eq!(body["code"], "BAD_REQUEST");
}
