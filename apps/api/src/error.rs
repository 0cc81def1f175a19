//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Rentiva                                │
//! │                                                                         │
//! │  Repository / Core                         HTTP Response                │
//! │  ─────────────────                         ─────────────                │
//! │                                                                         │
//! │  CoreError::ProductUnavailable ──► 400 VALIDATION_ERROR field=product  │
//! │  CoreError::InvalidDateRange ────► 400 VALIDATION_ERROR                │
//! │  CoreError::OrderNotFound ───────► 404 NOT_FOUND                       │
//! │  CoreError::NotOrderOwner ───────► 403 PERMISSION_DENIED               │
//! │  CoreError::InvalidStatusTransition ► 400 CONFLICT                     │
//! │  DbError::UniqueViolation ───────► 400 VALIDATION_ERROR                │
//! │  DbError::QueryFailed ───────────► 500 DATABASE_ERROR                  │
//! │                                                                         │
//! │  Every body: { "code": "...", "message": "...", "field": "..."? }      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Authorization failures on orders are deliberately indistinguishable from
//! not-found: the repositories return `OrderNotFound` for anything outside
//! the caller's visibility set, and this module never upgrades that to 403.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use rentiva_core::{CoreError, ValidationError};
use rentiva_db::DbError;

/// API error returned from HTTP handlers.
///
/// ## Serialization
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "Product prod-1 is not available for rent",
///   "field": "product"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// The offending field, when one applies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found, or outside the caller's visibility (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Invalid state transition (400)
    Conflict,

    /// Caller lacks rights on a resource they can see (403)
    PermissionDenied,

    /// Missing or invalid bearer token (401)
    Unauthorized,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            field: None,
        }
    }

    /// Attaches the offending field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// The HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self.code {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Conflict => StatusCode::BAD_REQUEST,
            ErrorCode::PermissionDenied => StatusCode::FORBIDDEN,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

/// The field a validation error complains about, for the `field` key.
fn validation_field(err: &ValidationError) -> String {
    match err {
        ValidationError::Required { field }
        | ValidationError::TooLong { field, .. }
        | ValidationError::MustBePositive { field }
        | ValidationError::InvalidFormat { field, .. }
        | ValidationError::Duplicate { field, .. } => field.clone(),
    }
}

/// Converts domain errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::ProductNotFound(_)
            | CoreError::OrderNotFound(_)
            | CoreError::CartLineNotFound(_) => ApiError::new(ErrorCode::NotFound, err.to_string()),

            CoreError::ProductUnavailable { .. } => {
                ApiError::validation(err.to_string()).with_field("product")
            }

            CoreError::InvalidDateRange { .. } => {
                ApiError::validation(err.to_string()).with_field("end_date")
            }

            CoreError::OrderLineDateRange { .. } => ApiError::validation(err.to_string()),

            CoreError::InvalidStatusTransition { .. } => {
                ApiError::new(ErrorCode::Conflict, err.to_string()).with_field("status")
            }

            CoreError::NotOrderOwner { .. } => {
                ApiError::new(ErrorCode::PermissionDenied, err.to_string())
            }

            CoreError::Validation(v) => {
                let field = validation_field(v);
                ApiError::validation(err.to_string()).with_field(field)
            }
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(core) => core.into(),

            DbError::NotFound { .. } => ApiError::new(ErrorCode::NotFound, err.to_string()),

            DbError::UniqueViolation { ref field, .. } => {
                let field = field.clone();
                ApiError::validation(err.to_string()).with_field(field)
            }

            DbError::ForeignKeyViolation { .. } => ApiError::validation(err.to_string()),

            // Infrastructure failures are opaque 500s; details go to logs,
            // not to clients.
            DbError::ConnectionFailed(_)
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::PoolExhausted
            | DbError::Internal(_) => {
                tracing::error!(error = %err, "Database failure");
                ApiError::new(ErrorCode::DatabaseError, "Internal database error")
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::not_found("Order", "x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::validation("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::unauthorized("no token").status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_unavailable_product_is_field_tagged_400() {
        let err: ApiError = CoreError::ProductUnavailable {
            product_id: "prod-1".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.field.as_deref(), Some("product"));
    }

    #[test]
    fn test_visibility_failures_stay_404() {
        let err: ApiError = CoreError::OrderNotFound("ord-1".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_cancel_gate_maps_to_conflict_400() {
        let err: ApiError = CoreError::InvalidStatusTransition {
            order_id: "ord-1".to_string(),
            current_status: "completed".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.message.contains("completed"));
    }

    #[test]
    fn test_non_owner_cancel_maps_to_403() {
        let err: ApiError = CoreError::NotOrderOwner {
            order_id: "ord-1".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_date_range_maps_to_400() {
        let err: ApiError = CoreError::InvalidDateRange {
            start: date(2025, 7, 7),
            end: date(2025, 7, 5),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_db_domain_errors_unwrap() {
        let err: ApiError =
            DbError::Domain(CoreError::ProductNotFound("prod-1".to_string())).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
