//! # Domain Types
//!
//! Core domain types shared by the database layer and the HTTP API.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Sales side                        Library side                         │
//! │  ┌─────────────────┐               ┌─────────────────┐                  │
//! │  │    Product      │               │  Person (role)  │                  │
//! │  │    Payment      │               │  Book / Copy    │                  │
//! │  │    Sale         │               │  Loan           │                  │
//! │  │    SaleItem     │               │  Debt           │                  │
//! │  └─────────────────┘               └─────────────────┘                  │
//! │                                                                         │
//! │  Discriminators (SMALLINT in the database, closed enums here)           │
//! │  ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐           │
//! │  │    SaleKind     │ │    SaleState    │ │   PersonRole    │           │
//! │  │  Sale       = 1 │ │  Confirmed  = 1 │ │  Member     = 1 │           │
//! │  │  Purchase   = 2 │ │  Pending    = 2 │ │  Librarian  = 2 │           │
//! │  │  Adjustment = 3 │ │  Voided     = 3 │ └─────────────────┘           │
//! │  └─────────────────┘ └─────────────────┘                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! JSON casing follows the HTTP surface each entity lives on: the sales
//! endpoints speak snake_case, the library endpoints camelCase.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Sale Kind
// =============================================================================

/// Discriminator for the three inventory-affecting transaction kinds.
///
/// Stored as SMALLINT. The numeric ids are part of the wire contract
/// (`kind_id` in requests and responses), never reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[repr(i16)]
pub enum SaleKind {
    /// Outgoing stock, requires sufficient stock up front.
    Sale = 1,
    /// Incoming stock.
    Purchase = 2,
    /// Signed correction, caller intent carries the sign.
    Adjustment = 3,
}

impl SaleKind {
    /// Every kind, in wire-id order.
    pub const ALL: [SaleKind; 3] = [SaleKind::Sale, SaleKind::Purchase, SaleKind::Adjustment];

    /// Wire id of this kind.
    #[inline]
    pub const fn id(self) -> i16 {
        self as i16
    }

    /// Human label used in hydrated responses.
    pub const fn label(self) -> &'static str {
        match self {
            SaleKind::Sale => "Sale",
            SaleKind::Purchase => "Purchase",
            SaleKind::Adjustment => "Adjustment",
        }
    }

    /// Looks a kind up by wire id.
    pub const fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(SaleKind::Sale),
            2 => Some(SaleKind::Purchase),
            3 => Some(SaleKind::Adjustment),
            _ => None,
        }
    }
}

// =============================================================================
// Sale State
// =============================================================================

/// Lifecycle status of a transaction header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[repr(i16)]
pub enum SaleState {
    Confirmed = 1,
    Pending = 2,
    Voided = 3,
}

impl SaleState {
    /// Every state, in wire-id order.
    pub const ALL: [SaleState; 3] = [
        SaleState::Confirmed,
        SaleState::Pending,
        SaleState::Voided,
    ];

    /// Wire id of this state.
    #[inline]
    pub const fn id(self) -> i16 {
        self as i16
    }

    /// Human label used in hydrated responses.
    pub const fn label(self) -> &'static str {
        match self {
            SaleState::Confirmed => "Confirmed",
            SaleState::Pending => "Pending",
            SaleState::Voided => "Voided",
        }
    }

    /// Looks a state up by wire id.
    pub const fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(SaleState::Confirmed),
            2 => Some(SaleState::Pending),
            3 => Some(SaleState::Voided),
            _ => None,
        }
    }
}

// =============================================================================
// Person Role
// =============================================================================

/// Role discriminator on the person table.
///
/// Each role carries its own generated human-facing code: members get
/// `S-xxxx` in `member_id`, librarians `B-xxxx` in `enrollment_librarian`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[repr(i16)]
pub enum PersonRole {
    Member = 1,
    Librarian = 2,
}

impl PersonRole {
    /// Wire id of this role.
    #[inline]
    pub const fn id(self) -> i16 {
        self as i16
    }

    /// Human label.
    pub const fn label(self) -> &'static str {
        match self {
            PersonRole::Member => "Member",
            PersonRole::Librarian => "Librarian",
        }
    }

    /// Prefix for the generated personal code.
    pub const fn code_prefix(self) -> &'static str {
        match self {
            PersonRole::Member => "S",
            PersonRole::Librarian => "B",
        }
    }

    /// Looks a role up by wire id.
    pub const fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(PersonRole::Member),
            2 => Some(PersonRole::Librarian),
            _ => None,
        }
    }
}

// =============================================================================
// Catalog Entities
// =============================================================================

/// A payment method (Cash, Credit Card, ...). Soft-deleted, never removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: i32,
    pub name: String,
    pub is_deleted: bool,
}

/// A product whose stock is mutated only by the sale pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Unit price, `NUMERIC(10,2)`.
    pub price: Decimal,
    /// Current stock. Decimal so fractional quantities (kg, liters) work.
    pub stock: Decimal,
    pub is_deleted: bool,
}

// =============================================================================
// Sale Entities
// =============================================================================

/// A transaction header row. Hydrated views live in the database layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: i32,
    pub date: DateTime<Utc>,
    pub total: Decimal,
    pub kind: i16,
    pub state: i16,
    pub payment_id: i32,
}

/// A transaction line. Composite identity `(sale_id, product_id)`.
///
/// `quantity` is stored as a positive magnitude; the movement direction
/// comes from the header kind. `subtotal` is always recomputed as
/// `quantity × unit_price` rounded to 2 decimals, never trusted from input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub sale_id: i32,
    pub product_id: i32,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

// =============================================================================
// Library Entities
// =============================================================================

/// A member or librarian. The two code columns are mutually exclusive,
/// driven by `role_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: i32,
    pub name: String,
    pub lastname: String,
    pub dni: String,
    pub role_id: i16,
    pub member_id: Option<String>,
    pub enrollment_librarian: Option<String>,
}

impl Person {
    /// Role of this person, if the stored discriminator is recognized.
    pub fn role(&self) -> Option<PersonRole> {
        PersonRole::from_id(self.role_id)
    }
}

/// A book title; physical instances are [`Copy`] rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
}

/// One lendable physical instance of a book.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Copy {
    pub id: i32,
    pub book_id: i32,
}

/// A loan row. Active while `returned_at` is null.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: i32,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub member_id: i32,
    /// Null once the librarian who approved the loan is deleted.
    pub librarian_id: Option<i32>,
    pub copy_id: i32,
}

impl Loan {
    /// Whether the loan is still open.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.returned_at.is_none()
    }
}

/// A debt spawned by a damaged return. `paid` flips one way only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: i32,
    pub amount: Decimal,
    pub paid: bool,
    pub member_id: i32,
    /// Kept after the loan itself is deleted.
    pub loan_id: Option<i32>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_ids_round_trip() {
        for kind in SaleKind::ALL {
            assert_eq!(SaleKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(SaleKind::from_id(0), None);
        assert_eq!(SaleKind::from_id(4), None);
    }

    #[test]
    fn test_state_ids_round_trip() {
        for state in SaleState::ALL {
            assert_eq!(SaleState::from_id(state.id()), Some(state));
        }
        assert_eq!(SaleState::from_id(-1), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(SaleKind::Sale.label(), "Sale");
        assert_eq!(SaleKind::Adjustment.label(), "Adjustment");
        assert_eq!(SaleState::Voided.label(), "Voided");
        assert_eq!(PersonRole::Member.label(), "Member");
    }

    #[test]
    fn test_role_code_prefixes() {
        assert_eq!(PersonRole::Member.code_prefix(), "S");
        assert_eq!(PersonRole::Librarian.code_prefix(), "B");
    }

    #[test]
    fn test_loan_activity() {
        let mut loan = Loan {
            id: 1,
            date_from: Utc::now(),
            date_to: Utc::now(),
            returned_at: None,
            member_id: 1,
            librarian_id: Some(2),
            copy_id: 3,
        };
        assert!(loan.is_active());
        loan.returned_at = Some(Utc::now());
        assert!(!loan.is_active());
    }

    #[test]
    fn test_person_serializes_camel_case() {
        let person = Person {
            id: 1,
            name: "Ana".to_string(),
            lastname: "Suarez".to_string(),
            dni: "30111222".to_string(),
            role_id: 1,
            member_id: Some("S-1234".to_string()),
            enrollment_librarian: None,
        };
        let json = serde_json::to_value(&person).unwrap();
        assert_eq!(json["memberId"], "S-1234");
        assert!(json["enrollmentLibrarian"].is_null());
        assert_eq!(json["roleId"], 1);
    }

    #[test]
    fn test_loan_serializes_camel_case() {
        let loan = Loan {
            id: 7,
            date_from: Utc::now(),
            date_to: Utc::now(),
            returned_at: None,
            member_id: 1,
            librarian_id: None,
            copy_id: 3,
        };
        let json = serde_json::to_value(&loan).unwrap();
        assert!(json.get("dateFrom").is_some());
        assert!(json.get("memberId").is_some());
        assert!(json.get("returnedAt").is_some());
    }
}
