//! # Sale Repository
//!
//! The transaction pipeline plus sale listing and hydration.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Sale Creation: one request, one transaction                │
//! │                                                                         │
//! │   1. validate payload          pure (ateneo-core)                       │
//! │   2. parse enums               pure                                     │
//! │   3. ensure payment exists     SQL                                      │
//! │   4. aggregate quantities      pure                                     │
//! │   5. lock product rows         SQL   SELECT ... FOR UPDATE, id ASC      │
//! │   6. build stock deltas        pure                                     │
//! │   7. validate stock            pure, against the locked rows            │
//! │   8. build line items          pure                                     │
//! │   9. persist header + items    SQL                                      │
//! │  10. apply stock deltas        SQL   stock = stock + delta              │
//! │  11. hydrate result            SQL                                      │
//! │                                                                         │
//! │  First failure rolls everything back. Lock order is ascending           │
//! │  product id in every transaction, so two overlapping sales can          │
//! │  wait on each other but never deadlock.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use ateneo_core::pipeline::{self, SaleRequest};
use ateneo_core::types::{Product, SaleKind, SaleState};
use ateneo_core::validation::{ensure_iso_utc, parse_enum_filter, parse_page, parse_page_size};

// =============================================================================
// Views
// =============================================================================

/// A hydrated sale header: ids and labels flattened side by side.
#[derive(Debug, Clone, Serialize)]
pub struct SaleSummary {
    pub id: i32,
    pub date: DateTime<Utc>,
    pub total: Decimal,
    pub kind_id: i16,
    pub kind_name: String,
    pub state_id: i16,
    pub state_name: String,
    pub payment_id: i32,
    pub payment_name: String,
}

/// A hydrated line item.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SaleItemView {
    pub product_id: i32,
    pub product_name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// A full hydrated sale, line items included.
#[derive(Debug, Clone, Serialize)]
pub struct SaleView {
    pub id: i32,
    pub date: DateTime<Utc>,
    pub total: Decimal,
    pub kind_id: i16,
    pub kind_name: String,
    pub state_id: i16,
    pub state_name: String,
    pub payment_id: i32,
    pub payment_name: String,
    pub items: Vec<SaleItemView>,
}

/// Raw query parameters for the sale listing.
#[derive(Debug, Clone, Default)]
pub struct SaleListQuery {
    pub page: Option<i64>,
    pub page_size: Option<String>,
    pub payment_id: Option<i32>,
    /// Comma-separated kind ids.
    pub kind_id: Option<String>,
    /// Comma-separated state ids.
    pub state_id: Option<String>,
    /// Single UTC day; mutually exclusive with the range below.
    pub day: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// One page of sales.
#[derive(Debug, Clone, Serialize)]
pub struct SalePage {
    pub items: Vec<SaleSummary>,
    pub total: i64,
    pub page: i64,
    #[serde(rename = "pageSize")]
    pub page_size: i64,
    pub pages: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: i32,
    date: DateTime<Utc>,
    total: Decimal,
    kind: i16,
    state: i16,
    payment_id: i32,
    payment_name: String,
}

// =============================================================================
// Helpers
// =============================================================================

fn kind_label(id: i16) -> String {
    SaleKind::from_id(id)
        .map(|k| k.label().to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn state_label(id: i16) -> String {
    SaleState::from_id(id)
        .map(|s| s.label().to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn to_summary(row: SaleRow) -> SaleSummary {
    SaleSummary {
        id: row.id,
        date: row.date,
        total: row.total,
        kind_id: row.kind,
        kind_name: kind_label(row.kind),
        state_id: row.state,
        state_name: state_label(row.state),
        payment_id: row.payment_id,
        payment_name: row.payment_name,
    }
}

fn page_count(total: i64, page_size: i64) -> i64 {
    let size = page_size.max(1);
    (total + size - 1) / size
}

fn missing_products_message(requested: &[i32], found: &BTreeSet<i32>) -> String {
    let missing: Vec<String> = requested
        .iter()
        .filter(|id| !found.contains(id))
        .map(|id| id.to_string())
        .collect();
    format!("Products with id {} do not exist", missing.join(", "))
}

/// Date filters after parsing: a single UTC day, or an inclusive range.
fn parse_date_filters(
    query: &SaleListQuery,
) -> DbResult<(Option<NaiveDate>, Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
    if query.day.is_some() && (query.date_from.is_some() || query.date_to.is_some()) {
        return Err(DbError::bad_request(
            "day cannot be combined with dateFrom/dateTo.",
        ));
    }

    let day = match query.day.as_deref() {
        Some(raw) => Some(ensure_iso_utc("day", raw)?.date_naive()),
        None => None,
    };

    let range = match (query.date_from.as_deref(), query.date_to.as_deref()) {
        (Some(from), Some(to)) => {
            let from = ensure_iso_utc("dateFrom", from)?;
            let to = ensure_iso_utc("dateTo", to)?;
            if from > to {
                return Err(DbError::bad_request("dateFrom cannot be later than dateTo."));
            }
            (Some(from), Some(to))
        }
        (None, None) => (None, None),
        _ => {
            return Err(DbError::bad_request(
                "To filter by date range, both dateFrom and dateTo are required.",
            ))
        }
    };

    Ok((day, range.0, range.1))
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: PgPool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: PgPool) -> Self {
        SaleRepository { pool }
    }

    /// Runs the transaction pipeline for one inbound payload.
    ///
    /// All eleven steps run against one transaction; any failure rolls
    /// the whole thing back and surfaces as a domain error.
    pub async fn create(&self, request: &SaleRequest) -> DbResult<SaleView> {
        // Steps 1-2: shape, then enum resolution. Pure.
        let validated = pipeline::validate_payload(request)?;
        let planned = pipeline::parse_enums(validated)?;

        let mut tx = self.pool.begin().await?;

        // Step 3: the payment method must exist.
        let payment_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM payment WHERE id = $1 AND is_deleted = FALSE)",
        )
        .bind(planned.payment_id)
        .fetch_one(&mut *tx)
        .await?;
        if !payment_exists {
            return Err(DbError::not_found("Payment method not found"));
        }

        // Step 4: required magnitude per product, quantity legality.
        let required = pipeline::aggregate_quantities(&planned)?;

        // Step 5: lock every referenced product row, ascending id.
        let ids: Vec<i32> = required.keys().copied().collect();
        let locked = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, stock, is_deleted
            FROM product
            WHERE id = ANY($1) AND is_deleted = FALSE
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await?;

        if locked.len() != ids.len() {
            let found: BTreeSet<i32> = locked.iter().map(|p| p.id).collect();
            return Err(DbError::not_found(missing_products_message(&ids, &found)));
        }
        debug!(products = locked.len(), "Locked product rows");

        let products: BTreeMap<i32, Product> = locked.into_iter().map(|p| (p.id, p)).collect();

        // Steps 6-7: signed deltas, then stock legality against the
        // locked rows. Both exhaustive, not first-failure.
        let deltas = pipeline::stock_deltas(&planned);
        pipeline::validate_stock(planned.operation, &required, &deltas, &products)?;

        // Step 8: line items and the rounded total.
        let (items, total) = pipeline::build_items(&planned, &products);

        // Step 9: persist header and items.
        let date = pipeline::resolve_sale_date(planned.date.as_deref())?;
        let sale_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO sale (date, total, kind, state, payment_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(date)
        .bind(total)
        .bind(planned.kind.id())
        .bind(planned.state.id())
        .bind(planned.payment_id)
        .fetch_one(&mut *tx)
        .await?;

        for item in &items {
            sqlx::query(
                r#"
                INSERT INTO sale_item (sale_id, product_id, quantity, unit_price, subtotal)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(sale_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.subtotal)
            .execute(&mut *tx)
            .await?;
        }

        // Step 10: atomic increments; zero deltas are skipped.
        for (product_id, delta) in &deltas {
            if delta.is_zero() {
                continue;
            }
            sqlx::query("UPDATE product SET stock = stock + $1 WHERE id = $2")
                .bind(*delta)
                .bind(*product_id)
                .execute(&mut *tx)
                .await?;
        }

        // Step 11: hydrate inside the transaction, then commit.
        let view = fetch_view(&mut tx, sale_id)
            .await?
            .ok_or_else(|| DbError::Internal("sale missing right after insert".to_string()))?;

        tx.commit().await?;

        info!(
            sale_id,
            total = %view.total,
            kind = planned.kind.id(),
            items = view.items.len(),
            "Sale recorded"
        );
        Ok(view)
    }

    /// Lists sales with filters and pagination.
    ///
    /// `pageSize` accepts a positive integer or `all`; `day` is mutually
    /// exclusive with the `dateFrom`/`dateTo` range, and a range needs
    /// both endpoints.
    pub async fn list(&self, query: &SaleListQuery) -> DbResult<SalePage> {
        let page = parse_page(query.page)?;
        let size = parse_page_size(query.page_size.as_deref())?;

        let kind_ids: Vec<i16> = SaleKind::ALL.iter().map(|k| k.id()).collect();
        let state_ids: Vec<i16> = SaleState::ALL.iter().map(|s| s.id()).collect();
        let kinds = parse_enum_filter("kind_id", query.kind_id.as_deref().unwrap_or(""), &kind_ids)?;
        let states =
            parse_enum_filter("state_id", query.state_id.as_deref().unwrap_or(""), &state_ids)?;
        let kinds = (!kinds.is_empty()).then_some(kinds);
        let states = (!states.is_empty()).then_some(states);

        let (day, from, to) = parse_date_filters(query)?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM sale s
            WHERE ($1::INT IS NULL OR s.payment_id = $1)
              AND ($2::SMALLINT[] IS NULL OR s.kind = ANY($2))
              AND ($3::SMALLINT[] IS NULL OR s.state = ANY($3))
              AND ($4::DATE IS NULL OR (s.date AT TIME ZONE 'UTC')::date = $4)
              AND ($5::TIMESTAMPTZ IS NULL OR s.date >= $5)
              AND ($6::TIMESTAMPTZ IS NULL OR s.date <= $6)
            "#,
        )
        .bind(query.payment_id)
        .bind(&kinds)
        .bind(&states)
        .bind(day)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        // `all` collapses to a single page sized to the full result.
        let (page, effective_size, limit, offset) = match size {
            Some(size) => (page, size, Some(size), (page - 1) * size),
            None => (1, total, None, 0),
        };

        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT s.id, s.date, s.total, s.kind, s.state, s.payment_id,
                   p.name AS payment_name
            FROM sale s
            JOIN payment p ON p.id = s.payment_id
            WHERE ($1::INT IS NULL OR s.payment_id = $1)
              AND ($2::SMALLINT[] IS NULL OR s.kind = ANY($2))
              AND ($3::SMALLINT[] IS NULL OR s.state = ANY($3))
              AND ($4::DATE IS NULL OR (s.date AT TIME ZONE 'UTC')::date = $4)
              AND ($5::TIMESTAMPTZ IS NULL OR s.date >= $5)
              AND ($6::TIMESTAMPTZ IS NULL OR s.date <= $6)
            ORDER BY s.date DESC, s.id DESC
            LIMIT $7 OFFSET $8
            "#,
        )
        .bind(query.payment_id)
        .bind(&kinds)
        .bind(&states)
        .bind(day)
        .bind(from)
        .bind(to)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(SalePage {
            items: rows.into_iter().map(to_summary).collect(),
            total,
            page,
            page_size: effective_size,
            pages: page_count(total, effective_size),
        })
    }

    /// Fetches one hydrated sale with its line items.
    pub async fn get_by_id(&self, id: i32) -> DbResult<SaleView> {
        let mut conn = self.pool.acquire().await?;
        fetch_view(&mut conn, id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale not found"))
    }
}

/// Hydrates one sale on the given connection (pool or open transaction).
async fn fetch_view(conn: &mut PgConnection, id: i32) -> DbResult<Option<SaleView>> {
    let row = sqlx::query_as::<_, SaleRow>(
        r#"
        SELECT s.id, s.date, s.total, s.kind, s.state, s.payment_id,
               p.name AS payment_name
        FROM sale s
        JOIN payment p ON p.id = s.payment_id
        WHERE s.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let items = sqlx::query_as::<_, SaleItemView>(
        r#"
        SELECT si.product_id,
               pr.name AS product_name,
               si.quantity,
               si.unit_price,
               si.subtotal
        FROM sale_item si
        JOIN product pr ON pr.id = si.product_id
        WHERE si.sale_id = $1
        ORDER BY si.product_id
        "#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    let summary = to_summary(row);
    Ok(Some(SaleView {
        id: summary.id,
        date: summary.date,
        total: summary.total,
        kind_id: summary.kind_id,
        kind_name: summary.kind_name,
        state_id: summary.state_id,
        state_name: summary.state_name,
        payment_id: summary.payment_id,
        payment_name: summary.payment_name,
        items,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_fall_back_to_unknown() {
        assert_eq!(kind_label(1), "Sale");
        assert_eq!(kind_label(3), "Adjustment");
        assert_eq!(kind_label(99), "Unknown");
        assert_eq!(state_label(2), "Pending");
        assert_eq!(state_label(0), "Unknown");
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 20), 0);
        assert_eq!(page_count(1, 20), 1);
        assert_eq!(page_count(20, 20), 1);
        assert_eq!(page_count(21, 20), 2);
    }

    #[test]
    fn page_count_handles_the_all_case() {
        // pageSize=all reports size == total.
        assert_eq!(page_count(0, 0), 0);
        assert_eq!(page_count(7, 7), 1);
    }

    #[test]
    fn missing_products_are_listed_in_order() {
        let found: BTreeSet<i32> = [2].into_iter().collect();
        assert_eq!(
            missing_products_message(&[1, 2, 3], &found),
            "Products with id 1, 3 do not exist"
        );
    }

    #[test]
    fn day_and_range_cannot_combine() {
        let query = SaleListQuery {
            day: Some("2026-04-01T00:00:00Z".to_string()),
            date_from: Some("2026-04-01T00:00:00Z".to_string()),
            date_to: Some("2026-04-02T00:00:00Z".to_string()),
            ..Default::default()
        };
        let err = parse_date_filters(&query).unwrap_err();
        assert_eq!(err.into_core().status(), 400);
    }

    #[test]
    fn half_open_range_is_rejected() {
        let query = SaleListQuery {
            date_from: Some("2026-04-01T00:00:00Z".to_string()),
            ..Default::default()
        };
        let err = parse_date_filters(&query).unwrap_err();
        match err.into_core() {
            ateneo_core::CoreError::BadRequest(msg) => {
                assert_eq!(
                    msg,
                    "To filter by date range, both dateFrom and dateTo are required."
                );
            }
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    #[test]
    fn inverted_range_is_rejected() {
        let query = SaleListQuery {
            date_from: Some("2026-04-02T00:00:00Z".to_string()),
            date_to: Some("2026-04-01T00:00:00Z".to_string()),
            ..Default::default()
        };
        let err = parse_date_filters(&query).unwrap_err();
        match err.into_core() {
            ateneo_core::CoreError::BadRequest(msg) => {
                assert_eq!(msg, "dateFrom cannot be later than dateTo.");
            }
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    #[test]
    fn day_filter_parses_to_a_utc_date() {
        let query = SaleListQuery {
            day: Some("2026-04-01T15:30:00Z".to_string()),
            ..Default::default()
        };
        let (day, from, to) = parse_date_filters(&query).unwrap();
        assert_eq!(day, Some(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()));
        assert!(from.is_none());
        assert!(to.is_none());
    }
}
