//! # Routes
//!
//! Axum router configuration for the Rentiva API.

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers;
use crate::state::AppState;

/// Create the main application router.
///
/// Routes:
/// - Cart:
///   - GET    /cart - Get-or-create the caller's cart
///   - POST   /cart-items - Add a line (201 created / 200 merged)
///   - PATCH  /cart-items/{id} - Update a caller-owned line
///   - DELETE /cart-items/{id} - Remove a caller-owned line
///   - POST   /cart-items/clear-cart - Idempotent clear
///
/// - Orders:
///   - POST /orders - Assemble an order (atomic, frozen total)
///   - GET  /orders - Visibility-scoped list (optional ?shop_id=)
///   - GET  /orders/{id} - Detail, 404 outside visibility
///   - POST /orders/{id}/cancel-order - Owner-only cancellation
///
/// - Ops:
///   - GET /health - Liveness + database ping (unauthenticated)
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - the browser frontend lives on another origin.
    // Authorization uses bearer headers, not cookies, so Any is acceptable.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let cart_routes = Router::new()
        .route("/cart", get(handlers::cart::get_cart))
        .route("/cart-items", post(handlers::cart::add_cart_item))
        .route(
            "/cart-items/{id}",
            patch(handlers::cart::update_cart_item).delete(handlers::cart::remove_cart_item),
        )
        .route("/cart-items/clear-cart", post(handlers::cart::clear_cart));

    let order_routes = Router::new()
        .route(
            "/orders",
            post(handlers::order::create_order).get(handlers::order::list_orders),
        )
        .route("/orders/{id}", get(handlers::order::get_order))
        .route(
            "/orders/{id}/cancel-order",
            post(handlers::order::cancel_order),
        );

    Router::new()
        .route("/health", get(handlers::health))
        .merge(cart_routes)
        .merge(order_routes)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rentiva_db::{Database, DbConfig};

    // Axum validates route patterns at construction time; building the
    // router catches conflicts like /cart-items/clear-cart vs {id}.
    #[tokio::test]
    async fn test_router_builds() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let state = AppState::with_database(db, "test-secret");
        let _router = create_router(state);
    }
}
