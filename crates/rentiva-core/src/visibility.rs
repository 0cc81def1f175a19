//! # Order Visibility Rules
//!
//! Pure authorization rules for who may see and act on orders.
//!
//! ## Actor Classes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Order Visibility                                     │
//! │                                                                         │
//! │  Admin          sees every order; may filter by any shop               │
//! │                                                                         │
//! │  Shop owner     detail: own orders ∪ orders touching their shop        │
//! │                 list default: own orders only                          │
//! │                 list with own shop id filter: the shop's orders        │
//! │                                                                         │
//! │  Customer       own orders only                                        │
//! │                                                                         │
//! │  Outside the visibility set, an order looks like it does not exist     │
//! │  (404, never 403) — existence must not leak.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! These functions are pure: the database layer resolves the facts (who
//! placed the order, which shops its lines touch, which shop the caller
//! owns) and the decision is made here, on an explicit [`Caller`].

use crate::types::Caller;

/// The set of orders a listing call may return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderListScope {
    /// Every order (admin without a filter).
    All,
    /// Orders containing at least one line from the given shop.
    Shop(String),
    /// Orders placed by the given user.
    Own(String),
    /// No orders at all (e.g. filtering by a shop the caller does not own).
    Empty,
}

/// Resolves the listing scope for a caller.
///
/// ## Arguments
/// * `caller` - Authenticated caller
/// * `shop_filter` - Optional `shop_id` query filter
/// * `owned_shop_id` - The shop the caller owns, if any (resolved from
///   current data, not from the token)
///
/// ## Rules
/// - Admins list everything, or one shop's orders when filtering.
/// - A non-admin filtering by their own shop lists that shop's orders.
/// - A non-admin filtering by any other shop gets an empty result, not an
///   error: the filter behaves like a search that found nothing.
/// - Without a filter everyone, shop owners included, lists only the orders
///   they personally placed.
pub fn list_scope(
    caller: &Caller,
    shop_filter: Option<&str>,
    owned_shop_id: Option<&str>,
) -> OrderListScope {
    if caller.is_admin() {
        return match shop_filter {
            Some(shop_id) => OrderListScope::Shop(shop_id.to_string()),
            None => OrderListScope::All,
        };
    }

    match shop_filter {
        Some(shop_id) => {
            if owned_shop_id == Some(shop_id) {
                OrderListScope::Shop(shop_id.to_string())
            } else {
                OrderListScope::Empty
            }
        }
        None => OrderListScope::Own(caller.user_id.clone()),
    }
}

/// Whether the caller may read a specific order.
///
/// ## Arguments
/// * `order_owner` - User id of the customer who placed the order
/// * `owns_shop_in_order` - Whether any line's product belongs to a shop
///   owned by the caller
pub fn can_view_order(caller: &Caller, order_owner: &str, owns_shop_in_order: bool) -> bool {
    caller.is_admin() || caller.user_id == order_owner || owns_shop_in_order
}

/// Whether the caller may cancel a specific order.
///
/// Only the owning customer may cancel — not shop owners, not admins.
/// Callers who can see the order but fail this check get a permission
/// error; callers who cannot see it at all must get not-found instead.
pub fn can_cancel_order(caller: &Caller, order_owner: &str) -> bool {
    caller.user_id == order_owner
}

// =============================================================================
// Unit Tests
// =============================================================================
