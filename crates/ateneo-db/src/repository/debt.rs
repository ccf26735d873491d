//! # Debt Repository
//!
//! Debts created on damaged returns. A debt is paid at most once; paying
//! an already-paid debt is a no-op that returns the debt unchanged.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;

use crate::error::{DbError, DbResult};
use ateneo_core::types::Debt;

/// A member debt with its loan context (copy and book, when the loan
/// still exists).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MemberDebtView {
    pub id: i32,
    pub amount: Decimal,
    pub paid: bool,
    pub member_id: i32,
    pub loan_id: Option<i32>,
    pub copy_id: Option<i32>,
    pub book_title: Option<String>,
    pub book_isbn: Option<String>,
}

/// Repository for debt operations.
#[derive(Debug, Clone)]
pub struct DebtRepository {
    pool: PgPool,
}

impl DebtRepository {
    /// Creates a new DebtRepository.
    pub fn new(pool: PgPool) -> Self {
        DebtRepository { pool }
    }

    /// Marks a debt as paid. Idempotent: an already-paid debt comes back
    /// unchanged with no error.
    pub async fn pay(&self, debt_id: i32) -> DbResult<Debt> {
        let debt = sqlx::query_as::<_, Debt>(
            r#"
            SELECT id, amount, paid, member_id, loan_id
            FROM debt
            WHERE id = $1
            "#,
        )
        .bind(debt_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Debt not found"))?;

        if debt.paid {
            return Ok(debt);
        }

        let paid = sqlx::query_as::<_, Debt>(
            r#"
            UPDATE debt
            SET paid = TRUE
            WHERE id = $1
            RETURNING id, amount, paid, member_id, loan_id
            "#,
        )
        .bind(debt_id)
        .fetch_one(&self.pool)
        .await?;

        info!(debt_id, amount = %paid.amount, "Debt paid");
        Ok(paid)
    }

    /// Lists a member's debts with loan/copy/book context.
    ///
    /// `only_unpaid` keeps the default view focused on open debts; pass
    /// false to include the full history.
    pub async fn list_for_member(
        &self,
        member_id: i32,
        only_unpaid: bool,
    ) -> DbResult<Vec<MemberDebtView>> {
        let debts = sqlx::query_as::<_, MemberDebtView>(
            r#"
            SELECT d.id,
                   d.amount,
                   d.paid,
                   d.member_id,
                   d.loan_id,
                   l.copy_id,
                   b.title AS book_title,
                   b.isbn  AS book_isbn
            FROM debt d
            LEFT JOIN loan l ON l.id = d.loan_id
            LEFT JOIN copy c ON c.id = l.copy_id
            LEFT JOIN book b ON b.id = c.book_id
            WHERE d.member_id = $1
              AND (NOT $2 OR d.paid = FALSE)
            ORDER BY d.id
            "#,
        )
        .bind(member_id)
        .bind(only_unpaid)
        .fetch_all(&self.pool)
        .await?;

        Ok(debts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_debt_view_serializes_camel_case() {
        let view = MemberDebtView {
            id: 7,
            amount: Decimal::new(150000, 2),
            paid: false,
            member_id: 3,
            loan_id: Some(12),
            copy_id: Some(4),
            book_title: Some("Rayuela".to_string()),
            book_isbn: Some("978-84-376-0494-7".to_string()),
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["memberId"], 3);
        assert_eq!(json["loanId"], 12);
        assert_eq!(json["bookTitle"], "Rayuela");
        assert_eq!(json["amount"], "1500.00");
    }
}
