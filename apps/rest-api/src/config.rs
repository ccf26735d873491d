//! REST API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. `DATABASE_URL` is the one variable without a default; the
//! server refuses to start without it rather than guessing at credentials.

use std::env;

/// REST API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// PostgreSQL connection string (required)
    pub database_url: String,

    /// Address the HTTP server binds to
    pub listen_addr: String,

    /// Maximum pooled database connections
    pub db_max_connections: u32,

    /// Whether to run embedded migrations on startup
    pub db_run_migrations: bool,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::MissingRequired("DATABASE_URL".to_string()))?,

            listen_addr: env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),

            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()))?,

            db_run_migrations: env::var("DB_RUN_MIGRATIONS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DB_RUN_MIGRATIONS".to_string()))?,
        };

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    // The only test in this crate that touches the process environment;
    // keep it that way or tests will race.

    #[test]
    fn missing_database_url_is_an_error() {
        env::remove_var("DATABASE_URL");
        let err = ApiConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(ref name) if name == "DATABASE_URL"));
    }
}
