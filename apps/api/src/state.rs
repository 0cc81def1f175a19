//! Shared application state for handlers.

use std::sync::Arc;

use rentiva_db::{Database, DbConfig};

use crate::auth::JwtManager;
use crate::config::ApiConfig;
use crate::error::ApiError;

/// Application state shared across all request handlers.
///
/// Cloneable: the database wraps a pooled connection set and the JWT
/// manager is reference-counted.
#[derive(Clone)]
pub struct AppState {
    /// Database handle (repositories hang off this).
    pub db: Database,

    /// Validates bearer tokens from the identity provider.
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    /// Connects the database (running migrations) and prepares shared state.
    pub async fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let db = Database::new(DbConfig::new(&config.database_path)).await?;

        Ok(AppState {
            db,
            jwt: Arc::new(JwtManager::new(config.jwt_secret.clone())),
        })
    }

    /// Builds state around an existing database (used by tests).
    pub fn with_database(db: Database, jwt_secret: &str) -> Self {
        AppState {
            db,
            jwt: Arc::new(JwtManager::new(jwt_secret.to_string())),
        }
    }
}
