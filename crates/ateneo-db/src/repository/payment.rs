//! # Payment Repository
//!
//! Read access to the payment method registry. Payment methods are seeded
//! by migration and soft-deleted, never removed, because historical sales
//! keep referencing them.

use sqlx::PgPool;

use crate::error::DbResult;
use ateneo_core::types::Payment;

/// Repository for payment method lookups.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: PgPool) -> Self {
        PaymentRepository { pool }
    }

    /// Lists active payment methods, ordered by id.
    pub async fn list_active(&self) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, name, is_deleted
            FROM payment
            WHERE is_deleted = FALSE
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }
}
