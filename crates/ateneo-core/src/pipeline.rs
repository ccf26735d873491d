//! # Sale Pipeline (pure steps)
//!
//! The sale/purchase/adjustment transaction runs as a fixed sequence of
//! steps over one accumulating context. The I/O-free steps live here; the
//! SQL steps live in the database layer's sale repository, which threads
//! the whole sequence through a single transaction.
//!
//! ## Step Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Sale Transaction Pipeline                           │
//! │                                                                         │
//! │   1  validate payload        pure, here     → ValidatedSale             │
//! │   2  parse enums             pure, here     → PlannedSale               │
//! │   3  ensure payment          SQL, repository                            │
//! │   4  aggregate quantities    pure, here     → required per product      │
//! │   5  load & lock products    SQL, repository (FOR UPDATE, id ASC)       │
//! │   6  build stock deltas      pure, here     → signed delta per product  │
//! │   7  validate stock          pure, here                                 │
//! │   8  build line items        pure, here     → rows + total              │
//! │   9  persist header + items  SQL, repository                            │
//! │  10  apply stock deltas      SQL, repository (atomic add)               │
//! │  11  hydrate result          SQL, repository                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failing step aborts the whole transaction. Field problems inside one
//! step aggregate into a single validation error; the steps themselves are
//! fail-fast.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::{fits_numeric_10_2, line_subtotal, round_money, MAX_NUMERIC_10_2};
use crate::operation::Operation;
use crate::types::{Product, SaleKind, SaleState};
use crate::validation::{ensure_iso_utc, collect_money_errors, parse_sale_kind, parse_sale_state};

// =============================================================================
// Request Shape
// =============================================================================

/// Inbound transaction payload, exactly as posted.
///
/// Everything is optional at this layer so one pass can report every
/// missing or malformed field instead of stopping at the first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRequest {
    pub payment_id: Option<i32>,
    pub kind_id: Option<i16>,
    pub state_id: Option<i16>,
    /// ISO-8601 UTC with `Z`; defaults to "now" when omitted.
    pub date: Option<String>,
    #[serde(default)]
    pub items: Vec<SaleItemRequest>,
}

/// One inbound line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItemRequest {
    pub product_id: Option<i32>,
    pub quantity: Option<Decimal>,
    /// Explicit price wins over the product's current price.
    pub unit_price: Option<Decimal>,
}

// =============================================================================
// Pipeline Context
// =============================================================================

/// A line that survived field validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleLine {
    pub product_id: i32,
    /// Raw signed quantity; sign only matters for adjustments.
    pub quantity: Decimal,
    pub unit_price: Option<Decimal>,
}

/// Field-validated payload, enums still raw.
#[derive(Debug, Clone)]
pub struct ValidatedSale {
    pub payment_id: i32,
    pub kind_id: i16,
    pub state_id: i16,
    pub date: Option<String>,
    pub lines: Vec<SaleLine>,
}

/// Payload with resolved kind, state and operation behavior.
#[derive(Debug, Clone)]
pub struct PlannedSale {
    pub payment_id: i32,
    pub kind: SaleKind,
    pub state: SaleState,
    pub operation: Operation,
    pub date: Option<String>,
    pub lines: Vec<SaleLine>,
}

/// A line ready to persist. One row per product; duplicated input lines
/// collapse into the same row because line identity is (sale, product).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSaleItem {
    pub product_id: i32,
    /// Positive magnitude; direction comes from the header kind.
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

// =============================================================================
// Step 1: Validate Payload
// =============================================================================

/// Shape-checks the payload, reporting every field problem at once.
///
/// An empty items array fails immediately; nothing else is worth
/// reporting about such a request.
pub fn validate_payload(request: &SaleRequest) -> CoreResult<ValidatedSale> {
    if request.items.is_empty() {
        return Err(CoreError::validation(vec![
            "items must contain at least one element".to_string(),
        ]));
    }

    let mut errors = Vec::new();

    let payment_id = match request.payment_id {
        Some(id) if id > 0 => Some(id),
        Some(_) => {
            errors.push("payment_id must be a positive integer".to_string());
            None
        }
        None => {
            errors.push("payment_id is required".to_string());
            None
        }
    };

    let kind_id = request.kind_id.or_else(|| {
        errors.push("kind_id is required".to_string());
        None
    });
    let state_id = request.state_id.or_else(|| {
        errors.push("state_id is required".to_string());
        None
    });

    let mut lines: Vec<Option<SaleLine>> = Vec::with_capacity(request.items.len());
    for (idx, item) in request.items.iter().enumerate() {
        let n = idx + 1;

        let product_id = match item.product_id {
            Some(id) if id > 0 => Some(id),
            _ => {
                errors.push(format!("product_id must be a positive integer (item #{n})"));
                None
            }
        };

        let quantity = match item.quantity {
            Some(q) => {
                if !fits_numeric_10_2(q) {
                    errors.push(format!(
                        "quantity must not exceed {MAX_NUMERIC_10_2} (item #{n})"
                    ));
                }
                Some(q)
            }
            None => {
                errors.push(format!("quantity is required (item #{n})"));
                None
            }
        };

        if let Some(unit_price) = item.unit_price {
            collect_money_errors(&format!("unit_price (item #{n})"), unit_price, &mut errors);
        }

        lines.push(match (product_id, quantity) {
            (Some(product_id), Some(quantity)) => Some(SaleLine {
                product_id,
                quantity,
                unit_price: item.unit_price,
            }),
            _ => None,
        });
    }

    match (errors.is_empty(), payment_id, kind_id, state_id) {
        (true, Some(payment_id), Some(kind_id), Some(state_id)) => Ok(ValidatedSale {
            payment_id,
            kind_id,
            state_id,
            date: request.date.clone(),
            lines: lines.into_iter().flatten().collect(),
        }),
        _ => Err(CoreError::validation(errors)),
    }
}

// =============================================================================
// Step 2: Parse Enums
// =============================================================================

/// Coerces the raw discriminants and resolves the operation behavior.
pub fn parse_enums(validated: ValidatedSale) -> CoreResult<PlannedSale> {
    let kind = parse_sale_kind(validated.kind_id)?;
    let state = parse_sale_state(validated.state_id)?;
    Ok(PlannedSale {
        payment_id: validated.payment_id,
        kind,
        state,
        operation: Operation::for_kind(kind),
        date: validated.date,
        lines: validated.lines,
    })
}

// =============================================================================
// Step 4: Aggregate Quantities
// =============================================================================

/// Collapses duplicated product lines into the total required magnitude
/// per product, checking each line's quantity against the operation.
///
/// The map is ordered by product id; the lock query iterates it as-is,
/// which keeps lock acquisition order identical across concurrent
/// transactions.
pub fn aggregate_quantities(planned: &PlannedSale) -> CoreResult<BTreeMap<i32, Decimal>> {
    let mut required = BTreeMap::new();
    let mut errors = Vec::new();

    for line in &planned.lines {
        if let Err(message) = planned
            .operation
            .assert_quantity(line.quantity, line.product_id)
        {
            errors.push(message);
            continue;
        }
        *required.entry(line.product_id).or_insert(Decimal::ZERO) += line.quantity.abs();
    }

    if errors.is_empty() {
        Ok(required)
    } else {
        Err(CoreError::validation(errors))
    }
}

// =============================================================================
// Step 6: Build Stock Deltas
// =============================================================================

/// Accumulates the signed stock delta per product across all lines.
pub fn stock_deltas(planned: &PlannedSale) -> BTreeMap<i32, Decimal> {
    let mut deltas = BTreeMap::new();
    for line in &planned.lines {
        *deltas.entry(line.product_id).or_insert(Decimal::ZERO) +=
            planned.operation.delta_from(line.quantity);
    }
    deltas
}

// =============================================================================
// Step 7: Validate Stock
// =============================================================================

/// Checks stock against the locked product rows. Exhaustive: every
/// violating product is reported, not just the first.
///
/// Sale transactions check required quantity against available stock.
/// The other kinds only guard against a negative resulting stock.
pub fn validate_stock(
    operation: Operation,
    required: &BTreeMap<i32, Decimal>,
    deltas: &BTreeMap<i32, Decimal>,
    products: &BTreeMap<i32, Product>,
) -> CoreResult<()> {
    let mut errors = Vec::new();

    if operation.requires_stock_check() {
        for (product_id, need) in required {
            if let Some(product) = products.get(product_id) {
                if product.stock < *need {
                    errors.push(format!(
                        "insufficient stock for product {product_id}: available {}, required {need}",
                        product.stock
                    ));
                }
            }
        }
    } else {
        for (product_id, delta) in deltas {
            if *delta >= Decimal::ZERO {
                continue;
            }
            if let Some(product) = products.get(product_id) {
                let resulting = product.stock + delta;
                if resulting < Decimal::ZERO {
                    errors.push(format!(
                        "product {product_id} would be left with negative stock ({resulting})"
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::validation(errors))
    }
}

// =============================================================================
// Step 8: Build Line Items
// =============================================================================

/// Resolves unit prices, computes rounded subtotals and the header total.
///
/// An explicit line price wins; otherwise the current price of the locked
/// product row is snapshotted. Lines referencing the same product merge:
/// quantities and subtotals add up, the first resolved price sticks.
pub fn build_items(
    planned: &PlannedSale,
    products: &BTreeMap<i32, Product>,
) -> (Vec<NewSaleItem>, Decimal) {
    let mut items: BTreeMap<i32, NewSaleItem> = BTreeMap::new();
    let mut total = Decimal::ZERO;

    for line in &planned.lines {
        let snapshot = products
            .get(&line.product_id)
            .map(|p| p.price)
            .unwrap_or_default();
        let unit_price = round_money(line.unit_price.unwrap_or(snapshot));
        let subtotal = line_subtotal(line.quantity, unit_price);
        total += subtotal;

        items
            .entry(line.product_id)
            .and_modify(|item| {
                item.quantity += line.quantity.abs();
                item.subtotal += subtotal;
            })
            .or_insert(NewSaleItem {
                product_id: line.product_id,
                quantity: line.quantity.abs(),
                unit_price,
                subtotal,
            });
    }

    (items.into_values().collect(), round_money(total))
}

// =============================================================================
// Step 9 Helper: Resolve Date
// =============================================================================

/// Resolves the header date: "now" when omitted, otherwise a strict
/// ISO-8601 UTC timestamp.
pub fn resolve_sale_date(raw: Option<&str>) -> CoreResult<DateTime<Utc>> {
    match raw {
        None => Ok(Utc::now()),
        Some(value) => ensure_iso_utc("date", value),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    fn money(n: i64) -> Decimal {
        Decimal::new(n, 2)
    }

    fn product(id: i32, price: Decimal, stock: Decimal) -> Product {
        Product {
            id,
            name: format!("Product {id}"),
            description: None,
            price,
            stock,
            is_deleted: false,
        }
    }

    fn products(list: Vec<Product>) -> BTreeMap<i32, Product> {
        list.into_iter().map(|p| (p.id, p)).collect()
    }

    fn full_request(items: Vec<SaleItemRequest>) -> SaleRequest {
        SaleRequest {
            payment_id: Some(3),
            kind_id: Some(1),
            state_id: Some(1),
            date: None,
            items,
        }
    }

    fn item(product_id: i32, quantity: i64) -> SaleItemRequest {
        SaleItemRequest {
            product_id: Some(product_id),
            quantity: Some(dec(quantity)),
            unit_price: None,
        }
    }

    fn plan(request: &SaleRequest) -> PlannedSale {
        parse_enums(validate_payload(request).unwrap()).unwrap()
    }

    // ---- step 1 ----

    #[test]
    fn test_empty_items_fail_immediately() {
        let request = SaleRequest {
            payment_id: None,
            kind_id: None,
            state_id: None,
            date: None,
            items: vec![],
        };
        let err = validate_payload(&request).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(
            err.details().unwrap(),
            &["items must contain at least one element".to_string()][..]
        );
    }

    #[test]
    fn test_validate_payload_reports_all_field_errors() {
        let request = SaleRequest {
            payment_id: Some(0),
            kind_id: None,
            state_id: Some(1),
            date: None,
            items: vec![
                SaleItemRequest {
                    product_id: None,
                    quantity: None,
                    unit_price: None,
                },
                SaleItemRequest {
                    product_id: Some(2),
                    quantity: Some(dec(1)),
                    unit_price: Some(Decimal::new(-10, 0)),
                },
            ],
        };

        let err = validate_payload(&request).unwrap_err();
        let details = err.details().unwrap();
        assert!(details.contains(&"payment_id must be a positive integer".to_string()));
        assert!(details.contains(&"kind_id is required".to_string()));
        assert!(details.contains(&"product_id must be a positive integer (item #1)".to_string()));
        assert!(details.contains(&"quantity is required (item #1)".to_string()));
        assert!(details.contains(&"unit_price (item #2) must not be negative".to_string()));
        // state_id was fine, no message about it
        assert!(!details.iter().any(|m| m.contains("state_id")));
    }

    #[test]
    fn test_validate_payload_bounds_quantity() {
        let over = MAX_NUMERIC_10_2 + Decimal::ONE;
        let request = full_request(vec![SaleItemRequest {
            product_id: Some(1),
            quantity: Some(over),
            unit_price: None,
        }]);
        let err = validate_payload(&request).unwrap_err();
        assert_eq!(
            err.details().unwrap(),
            &["quantity must not exceed 99999999.99 (item #1)".to_string()][..]
        );
    }

    #[test]
    fn test_validate_payload_refines_lines() {
        let request = full_request(vec![item(1, 2), item(4, 5)]);
        let validated = validate_payload(&request).unwrap();
        assert_eq!(validated.payment_id, 3);
        assert_eq!(validated.lines.len(), 2);
        assert_eq!(validated.lines[1].product_id, 4);
        assert_eq!(validated.lines[1].quantity, dec(5));
    }

    // ---- step 2 ----

    #[test]
    fn test_parse_enums_resolves_operation() {
        let mut request = full_request(vec![item(1, 2)]);
        request.kind_id = Some(3);
        request.state_id = Some(2);

        let planned = plan(&request);
        assert_eq!(planned.kind, SaleKind::Adjustment);
        assert_eq!(planned.state, SaleState::Pending);
        assert_eq!(planned.operation, Operation::Adjustment);
    }

    #[test]
    fn test_parse_enums_rejects_unknown_kind() {
        let mut request = full_request(vec![item(1, 2)]);
        request.kind_id = Some(7);
        let err = parse_enums(validate_payload(&request).unwrap()).unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
        assert_eq!(err.to_string(), "kind_id must be one of [1, 2, 3]");
    }

    // ---- step 4 ----

    #[test]
    fn test_aggregate_quantities_collapses_duplicates() {
        let request = full_request(vec![item(1, 2), item(1, 3), item(2, 4)]);
        let required = aggregate_quantities(&plan(&request)).unwrap();
        assert_eq!(required[&1], dec(5));
        assert_eq!(required[&2], dec(4));
    }

    #[test]
    fn test_aggregate_quantities_reports_every_bad_line() {
        let request = full_request(vec![item(1, 0), item(2, -1), item(3, 4)]);
        let err = aggregate_quantities(&plan(&request)).unwrap_err();
        assert_eq!(
            err.details().unwrap(),
            &[
                "quantity must be greater than zero for product 1".to_string(),
                "quantity must be greater than zero for product 2".to_string(),
            ][..]
        );
    }

    #[test]
    fn test_aggregate_quantities_uses_magnitudes_for_adjustments() {
        let mut request = full_request(vec![item(1, -3)]);
        request.kind_id = Some(3);
        let required = aggregate_quantities(&plan(&request)).unwrap();
        assert_eq!(required[&1], dec(3));
    }

    // ---- step 6 ----

    #[test]
    fn test_stock_deltas_per_operation() {
        let sale = plan(&full_request(vec![item(1, 2), item(1, 3)]));
        assert_eq!(stock_deltas(&sale)[&1], dec(-5));

        let mut request = full_request(vec![item(1, 2)]);
        request.kind_id = Some(2);
        assert_eq!(stock_deltas(&plan(&request))[&1], dec(2));

        let mut request = full_request(vec![item(1, -4), item(1, 1)]);
        request.kind_id = Some(3);
        assert_eq!(stock_deltas(&plan(&request))[&1], dec(-3));
    }

    // ---- step 7 ----

    #[test]
    fn test_validate_stock_lists_every_insufficient_product() {
        let sale = plan(&full_request(vec![item(1, 2), item(2, 10)]));
        let required = aggregate_quantities(&sale).unwrap();
        let deltas = stock_deltas(&sale);
        let locked = products(vec![
            product(1, money(500), dec(1)),
            product(2, money(300), dec(3)),
        ]);

        let err = validate_stock(sale.operation, &required, &deltas, &locked).unwrap_err();
        assert_eq!(
            err.details().unwrap(),
            &[
                "insufficient stock for product 1: available 1, required 2".to_string(),
                "insufficient stock for product 2: available 3, required 10".to_string(),
            ][..]
        );
    }

    #[test]
    fn test_validate_stock_passes_with_enough_stock() {
        let sale = plan(&full_request(vec![item(1, 2)]));
        let required = aggregate_quantities(&sale).unwrap();
        let deltas = stock_deltas(&sale);
        let locked = products(vec![product(1, money(500), dec(10))]);
        assert!(validate_stock(sale.operation, &required, &deltas, &locked).is_ok());
    }

    #[test]
    fn test_purchase_skips_stock_check() {
        let mut request = full_request(vec![item(1, 50)]);
        request.kind_id = Some(2);
        let purchase = plan(&request);
        let required = aggregate_quantities(&purchase).unwrap();
        let deltas = stock_deltas(&purchase);
        let locked = products(vec![product(1, money(500), dec(0))]);
        assert!(validate_stock(purchase.operation, &required, &deltas, &locked).is_ok());
    }

    #[test]
    fn test_adjustment_cannot_drive_stock_negative() {
        let mut request = full_request(vec![item(1, -5), item(2, -1)]);
        request.kind_id = Some(3);
        let adjustment = plan(&request);
        let required = aggregate_quantities(&adjustment).unwrap();
        let deltas = stock_deltas(&adjustment);
        let locked = products(vec![
            product(1, money(500), dec(3)),
            product(2, money(300), dec(1)),
        ]);

        let err = validate_stock(adjustment.operation, &required, &deltas, &locked).unwrap_err();
        assert_eq!(
            err.details().unwrap(),
            &["product 1 would be left with negative stock (-2)".to_string()][..]
        );
    }

    // ---- step 8 ----

    #[test]
    fn test_build_items_snapshots_product_price() {
        let sale = plan(&full_request(vec![item(1, 2)]));
        let locked = products(vec![product(1, Decimal::new(5000, 0), dec(10))]);

        let (items, total) = build_items(&sale, &locked);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].unit_price, Decimal::new(5000, 0));
        assert_eq!(items[0].subtotal, Decimal::new(10000, 0));
        assert_eq!(total, Decimal::new(10000, 0));
    }

    #[test]
    fn test_build_items_explicit_price_wins() {
        let request = full_request(vec![SaleItemRequest {
            product_id: Some(1),
            quantity: Some(dec(3)),
            unit_price: Some(money(250)), // 2.50
        }]);
        let locked = products(vec![product(1, money(999), dec(10))]);

        let (items, total) = build_items(&plan(&request), &locked);
        assert_eq!(items[0].unit_price, money(250));
        assert_eq!(items[0].subtotal, money(750));
        assert_eq!(total, money(750));
    }

    #[test]
    fn test_build_items_merges_duplicate_product_lines() {
        let request = full_request(vec![item(1, 2), item(1, 3)]);
        let locked = products(vec![product(1, money(100), dec(10))]); // 1.00

        let (items, total) = build_items(&plan(&request), &locked);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, dec(5));
        assert_eq!(items[0].subtotal, money(500));
        assert_eq!(total, money(500));
    }

    #[test]
    fn test_build_items_rounds_each_subtotal() {
        // 3 × 3.33 = 9.99; two lines → total 19.98
        let request = full_request(vec![
            SaleItemRequest {
                product_id: Some(1),
                quantity: Some(dec(3)),
                unit_price: Some(money(333)),
            },
            SaleItemRequest {
                product_id: Some(2),
                quantity: Some(dec(3)),
                unit_price: Some(money(333)),
            },
        ]);
        let locked = products(vec![
            product(1, money(100), dec(10)),
            product(2, money(100), dec(10)),
        ]);

        let (items, total) = build_items(&plan(&request), &locked);
        let sum: Decimal = items.iter().map(|i| i.subtotal).sum();
        assert_eq!(sum, money(1998));
        assert_eq!(total, money(1998));
    }

    #[test]
    fn test_build_items_uses_magnitude_for_adjustments() {
        let mut request = full_request(vec![item(1, -4)]);
        request.kind_id = Some(3);
        let locked = products(vec![product(1, money(200), dec(10))]); // 2.00

        let (items, total) = build_items(&plan(&request), &locked);
        assert_eq!(items[0].quantity, dec(4));
        assert_eq!(items[0].subtotal, money(800));
        assert_eq!(total, money(800));
    }

    // ---- date ----

    #[test]
    fn test_resolve_sale_date() {
        assert!(resolve_sale_date(None).is_ok());

        let parsed = resolve_sale_date(Some("2024-05-01T10:00:00Z")).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-05-01T10:00:00+00:00");

        let err = resolve_sale_date(Some("2024-05-01T10:00:00+03:00")).unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
    }
}
