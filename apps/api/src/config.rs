//! API server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults suitable for local development.

use std::env;
use std::net::SocketAddr;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// Shared secret for validating bearer tokens from the identity provider
    pub jwt_secret: String,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "./rentiva.db".to_string()),

            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                // In production, this MUST be set via environment variable
                // and match the identity provider's signing secret
                "rentiva-dev-secret-change-in-production".to_string()
            }),
        };

        Ok(config)
    }

    /// The socket address to bind the HTTP listener to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.http_port))
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

    #[test]
    fn test_defaults() {
        // Scoped to variables this test does not set; load() falls back.
        let config = ApiConfig::load().unwrap();
        assert!(!config.database_path.is_empty());
        assert!(!config.jwt_secret.is_empty());
        assert_eq!(config.socket_addr().port(), config.http_port);
    }
}
