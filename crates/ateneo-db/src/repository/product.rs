//! # Product Repository
//!
//! Product registry operations. Stock is intentionally absent from this
//! module's write paths: it moves only through the sale pipeline's
//! delta step, never by direct update.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use ateneo_core::types::Product;
use ateneo_core::validation::collect_money_errors;
use ateneo_core::{CoreError, CoreResult};

/// Inbound payload for product registration.
///
/// Everything optional so validation can report all problems at once.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    /// Opening stock; defaults to zero.
    pub stock: Option<Decimal>,
}

/// Shape-checks a registration payload, reporting every problem at once.
///
/// Returns the trimmed name, the price and the opening stock.
fn validate_new_product(req: &NewProductRequest) -> CoreResult<(String, Decimal, Decimal)> {
    let mut errors = Vec::new();

    let name = match req.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => Some(name.to_string()),
        _ => {
            errors.push("name is required".to_string());
            None
        }
    };

    let price = match req.price {
        Some(price) => {
            collect_money_errors("price", price, &mut errors);
            Some(price)
        }
        None => {
            errors.push("price is required".to_string());
            None
        }
    };

    let stock = req.stock.unwrap_or_default();
    collect_money_errors("stock", stock, &mut errors);

    match (errors.is_empty(), name, price) {
        (true, Some(name), Some(price)) => Ok((name, price, stock)),
        _ => Err(CoreError::validation(errors)),
    }
}

/// Repository for product registry operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: PgPool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products that are not soft-deleted, ordered by id.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, stock, is_deleted
            FROM product
            WHERE is_deleted = FALSE
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by id. Soft-deleted products read as absent.
    pub async fn get_by_id(&self, id: i32) -> DbResult<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, stock, is_deleted
            FROM product
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Product not found"))?;

        Ok(product)
    }

    /// Registers a new product.
    pub async fn create(&self, req: &NewProductRequest) -> DbResult<Product> {
        let (name, price, stock) = validate_new_product(req)?;

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO product (name, description, price, stock)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, price, stock, is_deleted
            "#,
        )
        .bind(name)
        .bind(&req.description)
        .bind(price)
        .bind(stock)
        .fetch_one(&self.pool)
        .await?;

        info!(product_id = product.id, name = %product.name, "Product registered");
        Ok(product)
    }

    /// Soft-deletes a product. Historical sale items keep referencing it.
    pub async fn soft_delete(&self, id: i32) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE product
            SET is_deleted = TRUE
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product not found"));
        }

        info!(product_id = id, "Product soft-deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, price: Decimal) -> NewProductRequest {
        NewProductRequest {
            name: Some(name.to_string()),
            description: None,
            price: Some(price),
            stock: None,
        }
    }

    #[test]
    fn empty_request_reports_every_missing_field() {
        let err = validate_new_product(&NewProductRequest::default()).unwrap_err();
        match err {
            CoreError::Validation { messages } => {
                assert_eq!(messages, vec!["name is required", "price is required"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_request_passes_with_default_stock() {
        let (name, price, stock) = validate_new_product(&request("  Notebook A5  ", Decimal::new(1250, 2))).unwrap();
        assert_eq!(name, "Notebook A5");
        assert_eq!(price, Decimal::new(1250, 2));
        assert_eq!(stock, Decimal::ZERO);
    }

    #[test]
    fn negative_values_are_flagged_together() {
        let req = NewProductRequest {
            name: Some("Pen".to_string()),
            description: None,
            price: Some(Decimal::new(-1, 0)),
            stock: Some(Decimal::new(-5, 0)),
        };
        let err = validate_new_product(&req).unwrap_err();
        match err {
            CoreError::Validation { messages } => {
                assert_eq!(
                    messages,
                    vec!["price must not be negative", "stock must not be negative"]
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
