//! Order handlers.
//!
//! ## Status Codes
//! ```text
//! POST /orders                    201  order with frozen total
//! GET  /orders[?shop_id=...]      200  visibility-scoped list
//! GET  /orders/{id}               200 | 404 outside visibility
//! POST /orders/{id}/cancel-order  200  updated order
//!                                 400  status forbids cancellation
//!                                 403  visible but not the owner
//!                                 404  outside visibility
//! ```

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use rentiva_db::{BillingDetails, NewOrder, OrderLineRequest, OrderWithLines};

// =============================================================================
// Request Types
// =============================================================================

/// One line of `order_items_data`.
#[derive(Debug, Deserialize)]
pub struct OrderItemData {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

fn default_quantity() -> i64 {
    1
}

/// Body of `POST /orders`.
///
/// Billing fields are freeform and optional; they are captured as given,
/// with no cross-validation against the user profile.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub billing_address: String,
    #[serde(default)]
    pub billing_city: String,
    #[serde(default)]
    pub billing_state: String,
    #[serde(default)]
    pub billing_zip: String,
    /// Opaque reference from the external payment flow.
    #[serde(default)]
    pub payment_reference: Option<String>,
    #[serde(default)]
    pub order_items_data: Vec<OrderItemData>,
}

impl CreateOrderRequest {
    fn into_new_order(self) -> NewOrder {
        NewOrder {
            billing: BillingDetails {
                first_name: self.first_name,
                last_name: self.last_name,
                email: self.email,
                phone: self.phone,
                billing_address: self.billing_address,
                billing_city: self.billing_city,
                billing_state: self.billing_state,
                billing_zip: self.billing_zip,
                payment_reference: self.payment_reference,
            },
            lines: self
                .order_items_data
                .into_iter()
                .map(|item| OrderLineRequest {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    start_date: item.start_date,
                    end_date: item.end_date,
                })
                .collect(),
        }
    }
}

/// Query parameters of `GET /orders`.
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub shop_id: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /orders` — assemble an order from line requests.
///
/// The caller becomes the order owner; prices are frozen per line and the
/// order plus all lines persist atomically.
pub async fn create_order(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderWithLines>), ApiError> {
    debug!(
        user_id = %caller.user_id,
        lines = request.order_items_data.len(),
        "create_order"
    );

    let order = state
        .db
        .orders()
        .create(&caller, request.into_new_order())
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /orders` — list orders visible to the caller, newest first.
///
/// Without `shop_id` everyone (shop owners included) lists only the orders
/// they personally placed. With `shop_id`, admins get that shop's orders,
/// the shop's owner gets the same, and everyone else gets an empty list.
pub async fn list_orders(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<OrderWithLines>>, ApiError> {
    let orders = state
        .db
        .orders()
        .list(&caller, query.shop_id.as_deref())
        .await?;

    Ok(Json(orders))
}

/// `GET /orders/{id}` — one order, 404 outside the caller's visibility.
pub async fn get_order(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(order_id): Path<String>,
) -> Result<Json<OrderWithLines>, ApiError> {
    let order = state
        .db
        .orders()
        .get_visible(&caller, &order_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", &order_id))?;

    Ok(Json(order))
}

/// `POST /orders/{id}/cancel-order` — cancel as the owning customer.
///
/// Restores availability for the order's products where it was cleared;
/// see the repository for the exact transition rules.
pub async fn cancel_order(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(order_id): Path<String>,
) -> Result<Json<OrderWithLines>, ApiError> {
    debug!(user_id = %caller.user_id, order_id = %order_id, "cancel_order");

    let order = state.db.orders().cancel(&caller, &order_id).await?;

    Ok(Json(order))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_order_request_shape() {
        let request: CreateOrderRequest = serde_json::from_str(
            r#"{
                "first_name": "Ava",
                "email": "ava@example.com",
                "payment_reference": "pay_123",
                "order_items_data": [
                    {
                        "product_id": "prod-1",
                        "quantity": 2,
                        "start_date": "2025-06-01",
                        "end_date": "2025-06-03"
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(request.order_items_data.len(), 1);
        assert_eq!(request.order_items_data[0].quantity, 2);

        let new_order = request.into_new_order();
        assert_eq!(new_order.billing.first_name, "Ava");
        assert_eq!(new_order.billing.payment_reference.as_deref(), Some("pay_123"));
        assert_eq!(new_order.lines[0].product_id, "prod-1");
    }

    #[test]
    fn test_billing_fields_default_to_empty() {
        let request: CreateOrderRequest =
            serde_json::from_str(r#"{ "order_items_data": [] }"#).unwrap();

        assert!(request.first_name.is_empty());
        assert!(request.payment_reference.is_none());
        assert!(request.order_items_data.is_empty());
    }
}
