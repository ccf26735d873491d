//! HTTP handlers, one module per resource.
//!
//! # Structure
//!
//! - [`health`] - liveness with a database ping
//! - [`sales`] - the transaction pipeline plus listing and hydration
//! - [`loans`] - loan, return, debt payment, active listing
//! - [`people`] - member/librarian registration, listings, member debts
//! - [`books`] - registration with copies, search, availability
//! - [`products`] - minimal product registry feeding the pipeline
//! - [`payments`] - payment method registry

pub mod books;
pub mod health;
pub mod loans;
pub mod payments;
pub mod people;
pub mod products;
pub mod sales;
