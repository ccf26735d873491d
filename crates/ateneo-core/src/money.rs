//! # Money Module
//!
//! Helpers for monetary and stock values backed by `NUMERIC(10,2)` columns.
//!
//! ## Where Money Flows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Product.price ──┬──► SaleItem.unit_price ──► SaleItem.subtotal         │
//! │                  │                                   │                  │
//! │  Product.stock ──┼──► stock deltas (signed)          ▼                  │
//! │                  │                            Sale.total = Σ subtotals  │
//! │  Debt.amount ────┘                                                      │
//! │                                                                         │
//! │  EVERY monetary value in the system is a rust_decimal::Decimal         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - Two fractional digits, rounded half away from zero (`2.345 → 2.35`)
//! - Magnitude capped at `99_999_999.99` (what `NUMERIC(10,2)` can hold)
//! - Subtotals are always recomputed from quantity and unit price, never
//!   trusted from input

use rust_decimal::{Decimal, RoundingStrategy};

// =============================================================================
// Bounds
// =============================================================================

/// Number of fractional digits for money and stock values.
pub const MONEY_SCALE: u32 = 2;

/// Largest magnitude a `NUMERIC(10,2)` column can hold: `99_999_999.99`.
///
/// The parts encode the mantissa `9_999_999_999` at scale 2.
pub const MAX_NUMERIC_10_2: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

// =============================================================================
// Helpers
// =============================================================================

/// Rounds a value to money scale, half away from zero.
///
/// ```
/// use ateneo_core::money::round_money;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_money(Decimal::new(23455, 3)), Decimal::new(2346, 2)); // 23.455 → 23.46
/// assert_eq!(round_money(Decimal::new(-23455, 3)), Decimal::new(-2346, 2));
/// ```
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Whether the magnitude fits in a `NUMERIC(10,2)` column.
pub fn fits_numeric_10_2(value: Decimal) -> bool {
    value.abs() <= MAX_NUMERIC_10_2
}

/// Whether the value has at most [`MONEY_SCALE`] fractional digits.
///
/// Trailing zeros do not count: `1.50` passes, `1.505` does not.
pub fn has_money_scale(value: Decimal) -> bool {
    value.normalize().scale() <= MONEY_SCALE
}

/// Line subtotal: `|quantity| × unit_price`, rounded to money scale.
///
/// The magnitude is taken here so adjustment lines with negative raw
/// quantities still produce a positive charge.
pub fn line_subtotal(quantity: Decimal, unit_price: Decimal) -> Decimal {
    round_money(quantity.abs() * unit_price)
}

// =============================================================================
// Unit Tests
// =============================================================================
