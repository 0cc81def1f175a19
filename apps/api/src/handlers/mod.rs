//! # Request Handlers
//!
//! Axum request handlers for the Rentiva API.
//!
//! Every handler takes the authenticated caller via the [`AuthUser`]
//! extractor and passes it explicitly into repository operations; there is
//! no ambient request identity anywhere below this layer.
//!
//! [`AuthUser`]: crate::auth::AuthUser

pub mod cart;
pub mod order;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::state::AppState;

/// Health check endpoint. The only unauthenticated route.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let status = if state.db.health_check().await {
        "healthy"
    } else {
        "degraded"
    };

    Json(serde_json::json!({
        "status": status,
        "service": "rentiva-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
