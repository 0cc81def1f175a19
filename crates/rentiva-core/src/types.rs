//! # Domain Types
//!
//! Core domain types used throughout Rentiva.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Shop        │   │    Product      │   │     Cart        │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  owner_id       │◄──│  shop_id (FK)   │   │  user_id (1:1)  │       │
//! │  │  name           │   │  price/day      │   │                 │       │
//! │  └─────────────────┘   │  available      │   └────────┬────────┘       │
//! │                        └─────────────────┘            │                │
//! │                                                       ▼                │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Order       │   │   OrderLine     │   │    CartLine     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  order_id (FK)  │   │  cart_id (FK)   │       │
//! │  │  status         │   │  price snapshot │   │  date range     │       │
//! │  │  frozen total   │   │  date range     │   │  quantity       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Pricing Model
//! Carts price lines against the product's *current* daily rate; orders
//! freeze the rate per line at checkout (snapshot pattern). The two never
//! mix: changing a product's price later changes cart subtotals but never a
//! placed order.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Ownership
// =============================================================================

/// Typed ownership capability.
///
/// Every ownable entity exposes its owning principal through this one
/// accessor, so authorization code dispatches on types instead of probing
/// for `owner`/`user` fields at runtime.
pub trait Owned {
    /// The user id of the owning principal.
    fn owner_id(&self) -> &str;
}

// =============================================================================
// Caller Identity
// =============================================================================

/// Role of an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular user: rents products, may also own a shop.
    Customer,
    /// Back-office staff: sees every order.
    Admin,
}

/// The authenticated caller, passed explicitly into every operation.
///
/// Identity is established by the external identity provider; this type is
/// what survives token validation. Shop ownership is intentionally NOT part
/// of the identity: it is resolved against current data per request, so a
/// shop created after token issuance is honored immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Caller {
    /// User id (subject claim from the identity provider).
    pub user_id: String,
    /// Caller role.
    pub role: Role,
}

impl Caller {
    /// Creates a customer caller.
    pub fn customer(user_id: impl Into<String>) -> Self {
        Caller {
            user_id: user_id.into(),
            role: Role::Customer,
        }
    }

    /// Creates an admin caller.
    pub fn admin(user_id: impl Into<String>) -> Self {
        Caller {
            user_id: user_id.into(),
            role: Role::Admin,
        }
    }

    /// Checks whether the caller has the admin role.
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// =============================================================================
// Shop
// =============================================================================

/// A shop listing rentable products. One shop per owner.
///
/// Shop CRUD itself lives outside this service; the entity is persisted
/// here because order visibility flows through product → shop → owner.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Shop {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// User id of the shop owner.
    pub owner_id: String,

    /// Display name.
    pub name: String,

    /// When the shop was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Owned for Shop {
    fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for rent, priced per calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Shop this product belongs to.
    pub shop_id: String,

    /// Display name.
    pub name: String,

    /// Optional long-form description.
    pub description: Option<String>,

    /// Daily rental rate in cents.
    pub price_per_day_cents: i64,

    /// Whether the product can currently be rented.
    ///
    /// Cart and order creation never mutate this flag; only order
    /// cancellation restores it.
    pub available: bool,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the daily rate as a Money type.
    #[inline]
    pub fn price_per_day(&self) -> Money {
        Money::from_cents(self.price_per_day_cents)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A user's shopping cart. One per user, created lazily on first access.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Cart {
    pub id: String,
    pub user_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Owned for Cart {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One (product, date range, quantity) entry in a cart.
///
/// ## Invariants
/// - At most one line per (cart, product, start, end): adding the same
///   product for the same exact range merges by summing quantities.
/// - No price is stored; subtotals use the product's current daily rate.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CartLine {
    pub id: String,
    pub cart_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// First rental day (inclusive).
    #[ts(as = "String")]
    pub start_date: NaiveDate,
    /// Last rental day (inclusive).
    #[ts(as = "String")]
    pub end_date: NaiveDate,
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

// =============================================================================
// Order Status
// =============================================================================

/// The lifecycle status of a rental order.
///
/// ```text
/// awaiting_confirmation ──► confirmed ──► active ──► completed
///          │                    │
///          └────────┬───────────┘
///                   ▼
///               cancelled
/// ```
///
/// `completed` and `cancelled` are terminal. Cancellation is the only
/// transition this service performs itself; confirm/activate/complete are
/// administrative writes by external tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Initial state: placed, waiting for the shop to confirm fulfillment.
    AwaitingConfirmation,
    /// Confirmed by the shop; items reserved for pickup/delivery.
    Confirmed,
    /// Rental period in progress.
    Active,
    /// Items returned; order closed.
    Completed,
    /// Cancelled by the customer before the rental became active.
    Cancelled,
}

impl OrderStatus {
    /// Stable snake_case name, matching the serialized and stored form.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::AwaitingConfirmation => "awaiting_confirmation",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Active => "active",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Whether the customer may still cancel from this state.
    pub fn can_cancel(&self) -> bool {
        matches!(
            self,
            OrderStatus::AwaitingConfirmation | OrderStatus::Confirmed
        )
    }

    /// Whether this state admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::AwaitingConfirmation
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Order
// =============================================================================

/// A placed rental order.
///
/// An order is an immutable snapshot of checkout-time pricing plus billing
/// contact fields; after creation only `status` changes (and `updated_at`
/// alongside it). `total_price_cents` is computed once and never
/// recalculated from current product prices.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub status: OrderStatus,
    /// Frozen total across all lines, in cents.
    pub total_price_cents: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub billing_address: String,
    pub billing_city: String,
    pub billing_state: String,
    pub billing_zip: String,
    /// Opaque reference from the external payment flow. Never interpreted.
    pub payment_reference: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the frozen total as Money.
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

impl Owned for Order {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// A line item in an order.
/// Uses snapshot pattern to freeze the daily rate at time of checkout.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Daily rate in cents at time of checkout (frozen).
    pub price_per_day_cents: i64,
    #[ts(as = "String")]
    pub start_date: NaiveDate,
    #[ts(as = "String")]
    pub end_date: NaiveDate,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderLine {
    /// Returns the frozen daily rate as Money.
    #[inline]
    pub fn price_per_day(&self) -> Money {
        Money::from_cents(self.price_per_day_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::AwaitingConfirmation);
    }

    #[test]
    fn test_order_status_cancel_gate() {
        assert!(OrderStatus::AwaitingConfirmation.can_cancel());
        assert!(OrderStatus::Confirmed.can_cancel());
        assert!(!OrderStatus::Active.can_cancel());
        assert!(!OrderStatus::Completed.can_cancel());
        assert!(!OrderStatus::Cancelled.can_cancel());
    }

    #[test]
    fn test_order_status_terminal() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::AwaitingConfirmation.is_terminal());
        assert!(!OrderStatus::Confirmed.is_terminal());
        assert!(!OrderStatus::Active.is_terminal());
    }

    #[test]
    fn test_order_status_serde_names() {
        let json = serde_json::to_string(&OrderStatus::AwaitingConfirmation).unwrap();
        assert_eq!(json, "\"awaiting_confirmation\"");
        let parsed: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, OrderStatus::Cancelled);
    }

    #[test]
    fn test_caller_roles() {
        let customer = Caller::customer("user-1");
        assert!(!customer.is_admin());

        let admin = Caller::admin("staff-1");
        assert!(admin.is_admin());
    }

    #[test]
    fn test_owned_accessors() {
        let shop = Shop {
            id: "shop-1".to_string(),
            owner_id: "user-1".to_string(),
            name: "Camera Rentals".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(Owned::owner_id(&shop), "user-1");
    }
}
