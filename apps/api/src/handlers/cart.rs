//! Cart handlers.
//!
//! ## Status Codes
//! ```text
//! GET    /cart                     200  get-or-create + lines + total
//! POST   /cart-items               201  new line created
//!                                  200  merged into an existing line
//! PATCH  /cart-items/{id}          200  updated line
//! DELETE /cart-items/{id}          204
//! POST   /cart-items/clear-cart    204  lines were removed
//!                                  200  cart was already empty
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use rentiva_db::{AddLineOutcome, CartLineUpdate, CartLineView, CartView};

// =============================================================================
// Request Types
// =============================================================================

/// Body of `POST /cart-items`.
#[derive(Debug, Deserialize)]
pub struct AddCartItemRequest {
    pub product_id: String,
    /// Number of units; defaults to 1.
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

fn default_quantity() -> i64 {
    1
}

/// Body of `PATCH /cart-items/{id}`; absent fields keep stored values.
#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /cart` — the caller's cart, created lazily on first access.
pub async fn get_cart(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<CartView>, ApiError> {
    let view = state.db.carts().get_view(&caller.user_id).await?;
    Ok(Json(view))
}

/// `POST /cart-items` — add a product for a rental period.
///
/// 201 when a new line is created, 200 when the quantity merged into an
/// existing line for the same exact (product, start, end) key.
pub async fn add_cart_item(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(request): Json<AddCartItemRequest>,
) -> Result<(StatusCode, Json<CartLineView>), ApiError> {
    debug!(
        user_id = %caller.user_id,
        product_id = %request.product_id,
        quantity = %request.quantity,
        "add_cart_item"
    );

    let (line, outcome) = state
        .db
        .carts()
        .add_line(
            &caller.user_id,
            &request.product_id,
            request.start_date,
            request.end_date,
            request.quantity,
        )
        .await?;

    let status = match outcome {
        AddLineOutcome::Created => StatusCode::CREATED,
        AddLineOutcome::Merged => StatusCode::OK,
    };

    Ok((status, Json(line)))
}

/// `PATCH /cart-items/{id}` — update quantity/dates of a caller-owned line.
pub async fn update_cart_item(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(line_id): Path<String>,
    Json(request): Json<UpdateCartItemRequest>,
) -> Result<Json<CartLineView>, ApiError> {
    let update = CartLineUpdate {
        quantity: request.quantity,
        start_date: request.start_date,
        end_date: request.end_date,
    };

    let line = state
        .db
        .carts()
        .update_line(&caller.user_id, &line_id, update)
        .await?;

    Ok(Json(line))
}

/// `DELETE /cart-items/{id}` — remove a caller-owned line.
pub async fn remove_cart_item(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(line_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .db
        .carts()
        .remove_line(&caller.user_id, &line_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `POST /cart-items/clear-cart` — delete all lines.
///
/// Idempotent: 204 when lines were removed, 200 with an explanatory body
/// when the cart was already empty.
pub async fn clear_cart(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Response, ApiError> {
    let removed = state.db.carts().clear(&caller.user_id).await?;

    if removed > 0 {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "detail": "Cart is already empty." })),
        )
            .into_response())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_request_quantity_defaults_to_one() {
        let request: AddCartItemRequest = serde_json::from_str(
            r#"{
                "product_id": "prod-1",
                "start_date": "2025-07-05",
                "end_date": "2025-07-07"
            }"#,
        )
        .unwrap();

        assert_eq!(request.quantity, 1);
        assert_eq!(request.start_date.to_string(), "2025-07-05");
    }

    #[test]
    fn test_update_request_allows_partial_bodies() {
        let request: UpdateCartItemRequest =
            serde_json::from_str(r#"{ "quantity": 4 }"#).unwrap();

        assert_eq!(request.quantity, Some(4));
        assert!(request.start_date.is_none());
        assert!(request.end_date.is_none());
    }
}
