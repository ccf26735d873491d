//! # Loan Repository
//!
//! Loan lifecycle: register, return, list active.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Loan Lifecycle                                    │
//! │                                                                         │
//! │  1. LOAN                                                                │
//! │     └── loan_book() → Loan { returned_at: NULL }                        │
//! │         Guard: at most one active loan per copy.                        │
//! │         The partial unique index ux_loan_copy_active is authoritative;  │
//! │         the in-transaction pre-check is only a fast path.               │
//! │                                                                         │
//! │  2. RETURN (one-way, terminal)                                          │
//! │     └── return_book() → Loan { returned_at: now }                       │
//! │         Damaged + amount > 0 also creates one Debt in the same          │
//! │         transaction.                                                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::repository::book::BookRepository;
use crate::repository::person::PersonRepository;
use ateneo_core::money::round_money;
use ateneo_core::types::{Debt, Loan};
use ateneo_core::validation::{ensure_iso_utc, parse_limit, parse_offset};

// =============================================================================
// Requests and Views
// =============================================================================

/// Inbound payload for loan registration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLoanRequest {
    pub member_id: Option<i32>,
    pub librarian_id: Option<i32>,
    pub copy_id: Option<i32>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// Inbound payload for a return.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    #[serde(default)]
    pub damaged: bool,
    pub damage_amount: Option<Decimal>,
}

/// Filters and paging for the active-loan listing.
#[derive(Debug, Clone, Default)]
pub struct ActiveLoanQuery {
    pub member_id: Option<i32>,
    pub librarian_id: Option<i32>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A loan hydrated with its member, librarian, copy and book.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LoanView {
    pub id: i32,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub member_id: i32,
    pub member_name: String,
    pub librarian_id: Option<i32>,
    pub librarian_name: Option<String>,
    pub copy_id: i32,
    pub book_id: i32,
    pub book_title: String,
    pub book_isbn: String,
}

/// Outcome of a return: the closed loan plus the debt, when one was
/// created.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnOutcome {
    pub loan: LoanView,
    pub created_debt: Option<Debt>,
}

/// One page of active loans.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveLoanPage {
    pub items: Vec<LoanView>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

const LOAN_VIEW_SELECT: &str = r#"
    SELECT l.id,
           l.date_from,
           l.date_to,
           l.returned_at,
           l.member_id,
           m.name || ' ' || m.lastname AS member_name,
           l.librarian_id,
           lib.name || ' ' || lib.lastname AS librarian_name,
           l.copy_id,
           c.book_id,
           b.title AS book_title,
           b.isbn  AS book_isbn
    FROM loan l
    JOIN person m ON m.id = l.member_id
    LEFT JOIN person lib ON lib.id = l.librarian_id
    JOIN copy c ON c.id = l.copy_id
    JOIN book b ON b.id = c.book_id
"#;

// =============================================================================
// Repository
// =============================================================================

/// Repository for loan operations.
#[derive(Debug, Clone)]
pub struct LoanRepository {
    pool: PgPool,
}

impl LoanRepository {
    /// Creates a new LoanRepository.
    pub fn new(pool: PgPool) -> Self {
        LoanRepository { pool }
    }

    /// Registers a loan of one copy to one member.
    ///
    /// The member and librarian must exist with the right roles, the copy
    /// must exist, and the copy must not be on an active loan. Two
    /// requests racing for the same copy both pass the pre-check at most
    /// once; the loser hits `ux_loan_copy_active` and gets the same
    /// Conflict.
    pub async fn loan_book(&self, req: &NewLoanRequest) -> DbResult<LoanView> {
        let (member_id, librarian_id, copy_id) = match (req.member_id, req.librarian_id, req.copy_id)
        {
            (Some(m), Some(l), Some(c)) => (m, l, c),
            _ => {
                return Err(DbError::bad_request(
                    "memberId, librarianId and copyId are required",
                ))
            }
        };

        let (date_from, date_to) = match (req.date_from.as_deref(), req.date_to.as_deref()) {
            (Some(from), Some(to)) => (
                ensure_iso_utc("dateFrom", from)?,
                ensure_iso_utc("dateTo", to)?,
            ),
            _ => return Err(DbError::bad_request("dateFrom and dateTo are required")),
        };

        let people = PersonRepository::new(self.pool.clone());
        let member = people.get_member(member_id).await?;
        let librarian = people.get_librarian(librarian_id).await?;
        let copy = BookRepository::new(self.pool.clone()).get_copy(copy_id).await?;

        let mut tx = self.pool.begin().await?;

        let active = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM loan WHERE copy_id = $1 AND returned_at IS NULL)",
        )
        .bind(copy.id)
        .fetch_one(&mut *tx)
        .await?;
        if active {
            return Err(DbError::conflict("Copy is already on loan"));
        }

        let loan_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO loan (date_from, date_to, returned_at, member_id, librarian_id, copy_id)
            VALUES ($1, $2, NULL, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(date_from)
        .bind(date_to)
        .bind(member.id)
        .bind(librarian.id)
        .bind(copy.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(loan_id, copy_id = copy.id, member_id = member.id, "Loan registered");
        self.get_view(loan_id).await
    }

    /// Closes a loan and, on a damaged return with a positive amount,
    /// creates the matching debt in the same transaction.
    pub async fn return_book(&self, loan_id: i32, req: &ReturnRequest) -> DbResult<ReturnOutcome> {
        let mut tx = self.pool.begin().await?;

        // Locking the row makes a concurrent second return see returned_at
        // and end up in the Conflict branch.
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            SELECT id, date_from, date_to, returned_at, member_id, librarian_id, copy_id
            FROM loan
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(loan_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Loan not found"))?;

        if loan.returned_at.is_some() {
            return Err(DbError::conflict("Loan was already returned"));
        }

        sqlx::query("UPDATE loan SET returned_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(loan_id)
            .execute(&mut *tx)
            .await?;

        let damage_amount = req.damage_amount.unwrap_or_default();
        let created_debt = if req.damaged && damage_amount > Decimal::ZERO {
            let debt = sqlx::query_as::<_, Debt>(
                r#"
                INSERT INTO debt (amount, paid, member_id, loan_id)
                VALUES ($1, FALSE, $2, $3)
                RETURNING id, amount, paid, member_id, loan_id
                "#,
            )
            .bind(round_money(damage_amount))
            .bind(loan.member_id)
            .bind(loan_id)
            .fetch_one(&mut *tx)
            .await?;
            Some(debt)
        } else {
            None
        };

        tx.commit().await?;

        info!(
            loan_id,
            debt_created = created_debt.is_some(),
            "Loan returned"
        );

        let loan = self.get_view(loan_id).await?;
        Ok(ReturnOutcome { loan, created_debt })
    }

    /// Lists active loans, optionally filtered by member and/or librarian.
    pub async fn list_active(&self, query: &ActiveLoanQuery) -> DbResult<ActiveLoanPage> {
        let limit = parse_limit(query.limit)?;
        let offset = parse_offset(query.offset)?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM loan l
            WHERE l.returned_at IS NULL
              AND ($1::INT IS NULL OR l.member_id = $1)
              AND ($2::INT IS NULL OR l.librarian_id = $2)
            "#,
        )
        .bind(query.member_id)
        .bind(query.librarian_id)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            r#"{LOAN_VIEW_SELECT}
            WHERE l.returned_at IS NULL
              AND ($1::INT IS NULL OR l.member_id = $1)
              AND ($2::INT IS NULL OR l.librarian_id = $2)
            ORDER BY l.date_from DESC, l.id DESC
            LIMIT $3 OFFSET $4
            "#
        );

        let items = sqlx::query_as::<_, LoanView>(&sql)
            .bind(query.member_id)
            .bind(query.librarian_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(ActiveLoanPage {
            items,
            total,
            limit,
            offset,
        })
    }

    /// Fetches one hydrated loan.
    pub async fn get_view(&self, loan_id: i32) -> DbResult<LoanView> {
        let mut conn = self.pool.acquire().await?;
        fetch_view(&mut conn, loan_id)
            .await?
            .ok_or_else(|| DbError::not_found("Loan not found"))
    }
}

async fn fetch_view(conn: &mut PgConnection, loan_id: i32) -> DbResult<Option<LoanView>> {
    let sql = format!("{LOAN_VIEW_SELECT} WHERE l.id = $1");
    let view = sqlx::query_as::<_, LoanView>(&sql)
        .bind(loan_id)
        .fetch_optional(conn)
        .await?;
    Ok(view)
}
