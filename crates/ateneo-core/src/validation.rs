//! # Validation Module
//!
//! Input validation utilities shared by the sale pipeline and the loan
//! lifecycle.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extraction (serde)                                       │
//! │  ├── JSON shape and primitive types                                     │
//! │  └── Rejections become 400 BAD_REQUEST                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE + pipeline step checks                            │
//! │  ├── Enum membership, date format, money bounds                         │
//! │  └── Field problems aggregate into one VALIDATION_ERROR                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: PostgreSQL                                                    │
//! │  ├── NOT NULL / UNIQUE / FK constraints                                 │
//! │  └── Partial unique index on active loans (authoritative under races)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::{CoreError, CoreResult};
use crate::money::{fits_numeric_10_2, has_money_scale, MAX_NUMERIC_10_2};
use crate::types::{Person, PersonRole, SaleKind, SaleState};

// =============================================================================
// Enum Coercion
// =============================================================================

/// Coerces a wire `kind_id` into the closed kind set.
pub fn parse_sale_kind(value: i16) -> CoreResult<SaleKind> {
    SaleKind::from_id(value)
        .ok_or_else(|| CoreError::bad_request("kind_id must be one of [1, 2, 3]"))
}

/// Coerces a wire `state_id` into the closed state set.
pub fn parse_sale_state(value: i16) -> CoreResult<SaleState> {
    SaleState::from_id(value)
        .ok_or_else(|| CoreError::bad_request("state_id must be one of [1, 2, 3]"))
}

/// Parses a comma-separated enum filter (`"1,3"`) against an allowed set.
///
/// Used by the sale listing for `kind_id` / `state_id` query filters.
/// A blank value means "no filter" and yields an empty vec; duplicates are
/// collapsed, empty tokens skipped.
pub fn parse_enum_filter(field: &str, raw: &str, allowed: &[i16]) -> CoreResult<Vec<i16>> {
    let bad = || {
        CoreError::bad_request(format!(
            "{field} must be a comma-separated list of values in {allowed:?}"
        ))
    };

    let mut values = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let value: i16 = token.parse().map_err(|_| bad())?;
        if !allowed.contains(&value) {
            return Err(bad());
        }
        if !values.contains(&value) {
            values.push(value);
        }
    }
    Ok(values)
}

// =============================================================================
// Date Guard
// =============================================================================

/// Parses a strict ISO-8601 UTC timestamp; the `Z` suffix is required.
///
/// Offset forms like `+00:00` are rejected even though they denote UTC.
pub fn ensure_iso_utc(field: &str, raw: &str) -> CoreResult<DateTime<Utc>> {
    let parsed = raw
        .ends_with('Z')
        .then(|| DateTime::parse_from_rfc3339(raw).ok())
        .flatten()
        .ok_or_else(|| {
            CoreError::bad_request(format!(
                "{field} must be an ISO-8601 UTC timestamp ending in 'Z'"
            ))
        })?;
    Ok(parsed.with_timezone(&Utc))
}

// =============================================================================
// Money Fields
// =============================================================================

/// Collects the field messages for a non-negative money value.
///
/// Checks sign, scale and `NUMERIC(10,2)` magnitude; every failing check
/// contributes one message.
pub fn collect_money_errors(field: &str, value: Decimal, errors: &mut Vec<String>) {
    if value < Decimal::ZERO {
        errors.push(format!("{field} must not be negative"));
    }
    if !has_money_scale(value) {
        errors.push(format!("{field} must have at most 2 decimal places"));
    }
    if !fits_numeric_10_2(value) {
        errors.push(format!("{field} must not exceed {MAX_NUMERIC_10_2}"));
    }
}

// =============================================================================
// Role Guard
// =============================================================================

/// Ensures a fetched person carries the expected role.
///
/// Absence is the caller's NotFound; this guard only covers the
/// wrong-role case, which is a bad request.
pub fn ensure_role(person: &Person, role: PersonRole) -> CoreResult<()> {
    if person.role() == Some(role) {
        return Ok(());
    }
    let noun = match role {
        PersonRole::Member => "member",
        PersonRole::Librarian => "librarian",
    };
    Err(CoreError::bad_request(format!(
        "Person {} is not a {noun}",
        person.id
    )))
}

// =============================================================================
// Pagination
// =============================================================================

/// Page number for the sale listing. Defaults to 1.
pub fn parse_page(value: Option<i64>) -> CoreResult<i64> {
    match value {
        None => Ok(1),
        Some(page) if page >= 1 => Ok(page),
        Some(_) => Err(CoreError::bad_request("page must be a positive integer")),
    }
}

/// Page size for the sale listing. `None` in the result means `all`.
pub fn parse_page_size(value: Option<&str>) -> CoreResult<Option<i64>> {
    match value {
        None => Ok(Some(20)),
        Some("all") => Ok(None),
        Some(raw) => match raw.parse::<i64>() {
            Ok(size) if size >= 1 => Ok(Some(size)),
            _ => Err(CoreError::bad_request(
                "pageSize must be a positive integer or 'all'",
            )),
        },
    }
}

/// Row limit for the active-loan listing, capped at 200. Defaults to 50.
pub fn parse_limit(value: Option<i64>) -> CoreResult<i64> {
    match value {
        None => Ok(50),
        Some(limit) if (1..=200).contains(&limit) => Ok(limit),
        Some(_) => Err(CoreError::bad_request("limit must be between 1 and 200")),
    }
}

/// Row offset for the active-loan listing. Defaults to 0.
pub fn parse_offset(value: Option<i64>) -> CoreResult<i64> {
    match value {
        None => Ok(0),
        Some(offset) if offset >= 0 => Ok(offset),
        Some(_) => Err(CoreError::bad_request("offset must not be negative")),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
