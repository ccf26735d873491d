//! # ateneo-core: Pure Business Logic for the Ateneo Backend
//!
//! This crate is the **heart** of the backend. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Ateneo Backend Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP clients                                 │   │
//! │  │    POST /sales ── POST /loan ── /loan/{id}/return ── listings   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ axum handlers (apps/rest-api)          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ ateneo-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ operation │  │ pipeline  │  │   │
//! │  │   │  entities │  │ NUMERIC   │  │ Sale/Pur/ │  │ pure sale │  │   │
//! │  │   │  + enums  │  │  (10,2)   │  │ Adjust    │  │ steps     │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   ateneo-db (Database Layer)                    │   │
//! │  │        PostgreSQL pool, transactions, repositories              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities and the smallint-backed discriminator enums
//! - [`money`] - `NUMERIC(10,2)` rounding, scale and magnitude rules
//! - [`operation`] - Sale/Purchase/Adjustment behavior behind one contract
//! - [`pipeline`] - The pure steps of the sale transaction pipeline
//! - [`validation`] - Enum coercion, date guard, field validators
//! - [`error`] - Domain error taxonomy with HTTP status/code mapping
//!
//! ## Example Usage
//!
//! ```rust
//! use ateneo_core::operation::Operation;
//! use ateneo_core::types::SaleKind;
//! use rust_decimal::Decimal;
//!
//! // A sale pulls stock out, whatever sign the caller sent
//! let op = Operation::for_kind(SaleKind::Sale);
//! assert!(op.requires_stock_check());
//! assert_eq!(op.delta_from(Decimal::new(2, 0)), Decimal::new(-2, 0));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod operation;
pub mod pipeline;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use ateneo_core::CoreError` instead of
// `use ateneo_core::error::CoreError`

pub use error::{CoreError, CoreResult};
pub use money::MAX_NUMERIC_10_2;
pub use operation::Operation;
pub use types::*;
