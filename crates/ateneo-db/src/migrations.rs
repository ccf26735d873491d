//! # Database Migrations
//!
//! Embedded schema migrations, compiled into the binary.
//!
//! ## How It Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Migration Flow                                       │
//! │                                                                         │
//! │  Build time:                                                            │
//! │    migrations/postgres/*.sql ──► sqlx::migrate!() ──► embedded in binary│
//! │                                                                         │
//! │  Startup:                                                               │
//! │    Database::new() ──► MIGRATOR.run(pool)                              │
//! │                          │                                              │
//! │                          ├── Creates _sqlx_migrations table             │
//! │                          ├── Compares applied vs embedded versions      │
//! │                          └── Applies pending migrations in order        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No runtime SQL files to ship; the schema travels with the executable.

use sqlx::migrate::Migrator;
use sqlx::PgPool;
use tracing::info;

use crate::error::DbResult;

/// Embedded migrations from `migrations/postgres/`.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations/postgres");

/// Runs all pending migrations against the given pool.
pub async fn run_migrations(pool: &PgPool) -> DbResult<()> {
    info!("Running database migrations");
    MIGRATOR.run(pool).await?;
    info!("Database migrations complete");
    Ok(())
}

/// Lists the embedded migration versions and descriptions (diagnostics).
pub fn migration_status() -> Vec<(i64, String)> {
    MIGRATOR
        .iter()
        .map(|m| (m.version, m.description.to_string()))
        .collect()
}
