//! # ateneo-db: Database Layer for Ateneo
//!
//! This crate provides database access for the Ateneo backend.
//! It uses PostgreSQL with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ateneo Data Flow                                 │
//! │                                                                         │
//! │  HTTP Handler (POST /sales, POST /loan, ...)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     ateneo-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (sale.rs,    │    │  (embedded)  │  │   │
//! │  │   │               │    │   loan.rs...) │    │              │  │   │
//! │  │   │ PgPool        │    │ SaleRepo      │    │ 0001_initial │  │   │
//! │  │   │ Connection    │◄───│ LoanRepo      │    │ 0002_seed_   │  │   │
//! │  │   │ Management    │    │ PersonRepo    │    │   payments   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     PostgreSQL                                  │   │
//! │  │   row locks (FOR UPDATE), partial unique indexes, NUMERIC      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types and constraint translation
//! - [`repository`] - Repository implementations (sale, loan, person, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ateneo_db::{Database, DbConfig};
//!
//! // Create database with default config (runs migrations)
//! let config = DbConfig::new("postgres://localhost:5432/ateneo");
//! let db = Database::new(config).await?;
//!
//! // Use repositories
//! let sale = db.sales().create(&request).await?;
//! let page = db.sales().list(&query).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::book::{BookAvailability, BookRepository, BookWithCopies, NewBookRequest};
pub use repository::debt::{DebtRepository, MemberDebtView};
pub use repository::loan::{
    ActiveLoanPage, ActiveLoanQuery, LoanRepository, LoanView, NewLoanRequest, ReturnOutcome,
    ReturnRequest,
};
pub use repository::payment::PaymentRepository;
pub use repository::person::{NewPersonRequest, PersonRepository};
pub use repository::product::{NewProductRequest, ProductRepository};
pub use repository::sale::{
    SaleItemView, SaleListQuery, SalePage, SaleRepository, SaleSummary, SaleView,
};
