//! # Ateneo REST API
//!
//! HTTP server for the Ateneo backend: sales, loans, people, books,
//! products and payment methods over JSON.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          REST API Layers                                │
//! │                                                                         │
//! │  Client ───► axum Router ───► handlers ───► ateneo-db repositories     │
//! │                  │                │                                     │
//! │                  │                └──► ApiError → {"error","code"}      │
//! │                  │                                                      │
//! │                  ├── TraceLayer   (request spans)                       │
//! │                  └── CorsLayer    (permissive; same-origin frontends    │
//! │                                    and curl both just work)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `DATABASE_URL` - PostgreSQL connection string (required)
//! - `LISTEN_ADDR` - bind address (default: 0.0.0.0:8080)
//! - `DB_MAX_CONNECTIONS` - pool size (default: 20)
//! - `DB_RUN_MIGRATIONS` - run embedded migrations on startup (default: true)
//! - `RUST_LOG` - tracing filter (default: info)

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

// Re-exports
pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult};
pub use routes::build_router;
pub use state::AppState;
