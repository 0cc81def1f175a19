//! JWT authentication module.
//!
//! Rentiva does not issue credentials: registration and login live in the
//! external identity provider. This module validates the bearer tokens that
//! provider signs (shared HS256 secret) and turns their claims into an
//! explicit [`Caller`] that handlers pass into every operation.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use rentiva_core::{Caller, Role};

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Caller role: "customer" or "admin"
    pub role: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

impl Claims {
    /// Converts validated claims into a caller identity.
    ///
    /// Unknown roles are rejected rather than downgraded: a typo'd claim
    /// must not silently become a customer session.
    pub fn to_caller(&self) -> Result<Caller, ApiError> {
        let role = match self.role.as_str() {
            "customer" => Role::Customer,
            "admin" => Role::Admin,
            other => {
                return Err(ApiError::unauthorized(format!(
                    "Unknown role in token: {other}"
                )))
            }
        };

        Ok(Caller {
            user_id: self.sub.clone(),
            role,
        })
    }
}

/// JWT token manager.
pub struct JwtManager {
    secret: String,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: String) -> Self {
        JwtManager { secret }
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ApiError::unauthorized(format!("Invalid token: {e}")))?;

        Ok(token_data.claims)
    }

    /// Generate a token for a user.
    ///
    /// ## When To Use
    /// Development tooling and tests. Production tokens come from the
    /// identity provider; this exists because it shares the same shape.
    pub fn generate_token(
        &self,
        user_id: &str,
        role: &str,
        lifetime_secs: i64,
    ) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(lifetime_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("Failed to generate token: {e}")))
    }
}

/// Extractor for the authenticated caller.
///
/// ## Usage
/// ```rust,ignore
/// pub async fn get_cart(
///     State(state): State<AppState>,
///     AuthUser(caller): AuthUser,
/// ) -> Result<Json<CartView>, ApiError> { ... }
/// ```
///
/// Missing, malformed, or expired tokens reject with 401 before the
/// handler body runs.
pub struct AuthUser(pub Caller);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Expected Bearer token"))?;

        let claims = state.jwt.validate_token(token)?;
        let caller = claims.to_caller()?;

        Ok(AuthUser(caller))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> JwtManager {
        JwtManager::new("test-secret".to_string())
    }

    #[test]
    fn test_token_round_trip() {
        let jwt = manager();
        let token = jwt.generate_token("user-1", "customer", 3600).unwrap();

        let claims = jwt.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "user-1");

        let caller = claims.to_caller().unwrap();
        assert_eq!(caller.user_id, "user-1");
        assert_eq!(caller.role, Role::Customer);
    }

    #[test]
    fn test_admin_role() {
        let jwt = manager();
        let token = jwt.generate_token("staff-1", "admin", 3600).unwrap();
        let caller = jwt.validate_token(&token).unwrap().to_caller().unwrap();
        assert!(caller.is_admin());
    }

    #[test]
    fn test_unknown_role_rejected() {
        let jwt = manager();
        let token = jwt.generate_token("user-1", "superuser", 3600).unwrap();
        let claims = jwt.validate_token(&token).unwrap();
        assert!(claims.to_caller().is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let jwt = manager();
        let token = jwt.generate_token("user-1", "customer", 3600).unwrap();

        let other = JwtManager::new("different-secret".to_string());
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let jwt = manager();
        // Already expired (exp in the past, beyond default leeway).
        let token = jwt.generate_token("user-1", "customer", -3600).unwrap();
        assert!(jwt.validate_token(&token).is_err());
    }
}
