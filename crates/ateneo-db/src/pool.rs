//! # Connection Pool Management
//!
//! PostgreSQL connection pool setup and the main [`Database`] handle.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Database Handle                                      │
//! │                                                                         │
//! │  DbConfig ──► Database::new() ──► PgPool (shared, cheap to clone)      │
//! │                     │                                                   │
//! │                     ├── runs embedded migrations (configurable off)     │
//! │                     │                                                   │
//! │                     └── repository accessors                            │
//! │                           ├── db.payments()  → PaymentRepository       │
//! │                           ├── db.products()  → ProductRepository       │
//! │                           ├── db.sales()     → SaleRepository          │
//! │                           ├── db.people()    → PersonRepository        │
//! │                           ├── db.books()     → BookRepository          │
//! │                           ├── db.loans()     → LoanRepository          │
//! │                           └── db.debts()     → DebtRepository          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pool is constructed once at startup and injected everywhere; there
//! is no lazy global.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::book::BookRepository;
use crate::repository::debt::DebtRepository;
use crate::repository::loan::LoanRepository;
use crate::repository::payment::PaymentRepository;
use crate::repository::person::PersonRepository;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("postgres://localhost/ateneo")
///     .max_connections(10)
///     .run_migrations(false);
/// let db = Database::new(config).await?;
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum number of pooled connections.
    pub max_connections: u32,

    /// Minimum number of idle connections kept open.
    pub min_connections: u32,

    /// How long to wait when acquiring a connection.
    pub connect_timeout: Duration,

    /// How long an idle connection lives before being closed.
    pub idle_timeout: Duration,

    /// Whether to run embedded migrations on startup.
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a config with sensible defaults for the given URL.
    pub fn new(database_url: impl Into<String>) -> Self {
        DbConfig {
            database_url: database_url.into(),
            max_connections: 20,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Sets the maximum connection count.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum idle connection count.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the acquire timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Enables or disables startup migrations.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }
}

/// Main database handle.
///
/// Owns the connection pool and hands out repositories. Clone freely;
/// clones share the same pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connects to PostgreSQL and (by default) applies migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            max_connections = config.max_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout)
            .connect(&config.database_url)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!("Connection pool established");

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Runs pending migrations.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    // =========================================================================
    // Repository Accessors
    // =========================================================================

    /// Payment method registry.
    pub fn payments(&self) -> PaymentRepository {
        PaymentRepository::new(self.pool.clone())
    }

    /// Product registry.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Sales, including the transaction pipeline.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    /// Members and librarians.
    pub fn people(&self) -> PersonRepository {
        PersonRepository::new(self.pool.clone())
    }

    /// Books and their copies.
    pub fn books(&self) -> BookRepository {
        BookRepository::new(self.pool.clone())
    }

    /// Loans and returns.
    pub fn loans(&self) -> LoanRepository {
        LoanRepository::new(self.pool.clone())
    }

    /// Member debts.
    pub fn debts(&self) -> DebtRepository {
        DebtRepository::new(self.pool.clone())
    }

    /// Pings the database (liveness checks).
    pub async fn health_check(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Closes the pool gracefully.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }
}
