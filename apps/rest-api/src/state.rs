//! Shared application state.

use ateneo_db::Database;

use crate::config::ApiConfig;

/// State threaded through every handler.
///
/// `Database` clones share one pool, so cloning this per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: ApiConfig,
}

impl AppState {
    /// Creates the shared state.
    pub fn new(db: Database, config: ApiConfig) -> Self {
        AppState { db, config }
    }
}
