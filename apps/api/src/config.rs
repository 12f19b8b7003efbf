//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults suitable for local development.

use std::env;
use std::path::PathBuf;

/// API service configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP listen port
    pub port: u16,

    /// Path to the store's SQLite database file
    pub database_path: PathBuf,

    /// Maximum connections in the database pool
    pub db_max_connections: u32,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            port: env::var("OPTIKA_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("OPTIKA_PORT".to_string()))?,

            database_path: env::var("OPTIKA_DATABASE_PATH")
                .unwrap_or_else(|_| "optika.db".to_string())
                .into(),

            db_max_connections: env::var("OPTIKA_DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("OPTIKA_DB_MAX_CONNECTIONS".to_string()))?,
        };

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // Scrub any OPTIKA_* vars the host machine may carry so the
        // defaults are what gets asserted.
        for var in [
            "OPTIKA_PORT",
            "OPTIKA_DATABASE_PATH",
            "OPTIKA_DB_MAX_CONNECTIONS",
        ] {
            std::env::remove_var(var);
        }

        let config = ApiConfig::load().unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_max_connections, 5);
    }
}
