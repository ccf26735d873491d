//! # Operation Strategy
//!
//! Behavior of the three inventory-affecting transaction kinds behind one
//! closed contract.
//!
//! ## Behavior Table
//! ```text
//! ┌──────────────┬──────────────┬────────────────────┬─────────────────────┐
//! │  Operation   │ stock check  │  legal quantity    │  stock delta        │
//! ├──────────────┼──────────────┼────────────────────┼─────────────────────┤
//! │  Sale        │  required    │  q > 0             │  −|q|               │
//! │  Purchase    │  none        │  q > 0             │  +|q|               │
//! │  Adjustment  │  none (*)    │  q ≠ 0             │  raw signed q       │
//! └──────────────┴──────────────┴────────────────────┴─────────────────────┘
//! (*) adjustments still may not drive stock below zero; that is checked
//!     against the computed result, not against available stock.
//! ```
//!
//! Resolved once per request from the wire `kind_id`; the mapping is total
//! over [`SaleKind`], so an unrecognized kind is unrepresentable here.

use rust_decimal::Decimal;

use crate::types::SaleKind;

// =============================================================================
// Operation
// =============================================================================

/// One of the three transaction behaviors, resolved from [`SaleKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Sale,
    Purchase,
    Adjustment,
}

impl Operation {
    /// Resolves the behavior for a transaction kind.
    pub const fn for_kind(kind: SaleKind) -> Self {
        match kind {
            SaleKind::Sale => Operation::Sale,
            SaleKind::Purchase => Operation::Purchase,
            SaleKind::Adjustment => Operation::Adjustment,
        }
    }

    /// Whether available stock must cover the required quantity up front.
    pub const fn requires_stock_check(self) -> bool {
        matches!(self, Operation::Sale)
    }

    /// Checks one line's quantity. `Err` carries the field message the
    /// caller aggregates into a validation error.
    pub fn assert_quantity(self, quantity: Decimal, product_id: i32) -> Result<(), String> {
        match self {
            Operation::Sale | Operation::Purchase => {
                if quantity <= Decimal::ZERO {
                    return Err(format!(
                        "quantity must be greater than zero for product {product_id}"
                    ));
                }
            }
            Operation::Adjustment => {
                if quantity.is_zero() {
                    return Err(format!("quantity must not be zero for product {product_id}"));
                }
            }
        }
        Ok(())
    }

    /// Signed stock delta contributed by one line with the given raw quantity.
    pub fn delta_from(self, raw_quantity: Decimal) -> Decimal {
        match self {
            Operation::Sale => -raw_quantity.abs(),
            Operation::Purchase => raw_quantity.abs(),
            Operation::Adjustment => raw_quantity,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
