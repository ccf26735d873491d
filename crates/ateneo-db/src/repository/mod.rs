//! # Repository Module
//!
//! Database repository implementations for Ateneo.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  HTTP Handler                                                           │
//! │       │                                                                 │
//! │       │  db.sales().create(request)                                    │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  SaleRepository                                                        │
//! │  ├── create(&self, request)      ← pipeline, one transaction           │
//! │  ├── list(&self, query)                                                │
//! │  └── get_by_id(&self, id)                                              │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  PostgreSQL                                                            │
//! │                                                                         │
//! │  Pure business rules (validation, money, strategy tables) stay in      │
//! │  ateneo-core; repositories interleave them with SQL.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`payment::PaymentRepository`] - Payment method registry
//! - [`product::ProductRepository`] - Product registry and soft delete
//! - [`sale::SaleRepository`] - Transaction pipeline, listing, hydration
//! - [`person::PersonRepository`] - Member/librarian registration
//! - [`book::BookRepository`] - Books, copies, availability
//! - [`loan::LoanRepository`] - Loans, returns, active listing
//! - [`debt::DebtRepository`] - Debt payment and member debt listing

pub mod book;
pub mod debt;
pub mod loan;
pub mod payment;
pub mod person;
pub mod product;
pub mod sale;
