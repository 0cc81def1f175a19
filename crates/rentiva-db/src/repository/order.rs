//! # Order Repository
//!
//! Database operations for rental orders and their lines.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE (one transaction)                                           │
//! │     └── create() → resolve products, freeze prices, sum total,         │
//! │         insert header + all lines — or nothing at all                  │
//! │                                                                         │
//! │  2. READ (visibility-scoped)                                           │
//! │     └── list() / get_visible() → an order outside the caller's        │
//! │         visibility set behaves exactly like a missing order            │
//! │                                                                         │
//! │  3. CANCEL (one transaction)                                           │
//! │     └── cancel() → status guard re-checked in SQL, then restore        │
//! │         availability for lines whose product is flagged unavailable    │
//! │                                                                         │
//! │  confirm/activate/complete are administrative writes by external       │
//! │  tooling and have no endpoint here.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Each order line stores the product's daily rate at checkout. Later price
//! changes never alter a placed order's total.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use rentiva_core::{
    pricing, validation, visibility, Caller, CoreError, Money, Order, OrderLine, OrderListScope,
    OrderStatus, Owned, Product, ValidationError,
};

// =============================================================================
// Input Types
// =============================================================================

/// One requested line of a checkout.
#[derive(Debug, Clone)]
pub struct OrderLineRequest {
    pub product_id: String,
    pub quantity: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Billing contact fields captured at checkout.
///
/// Freeform: nothing here is cross-validated against the user profile, and
/// `payment_reference` is an opaque string from the external payment flow.
#[derive(Debug, Clone, Default)]
pub struct BillingDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub billing_address: String,
    pub billing_city: String,
    pub billing_state: String,
    pub billing_zip: String,
    pub payment_reference: Option<String>,
}

/// A checkout request: billing details plus the ordered line requests.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub billing: BillingDetails,
    pub lines: Vec<OrderLineRequest>,
}

// =============================================================================
// View Types
// =============================================================================

/// One order line joined with its product name, with the line total
/// computed from the frozen snapshot price.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLineView {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    /// Daily rate frozen at checkout, in cents.
    pub price_per_day_cents: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// price_per_day_at_order_time × rental_days × quantity, in cents.
    pub item_total_cents: i64,
}

/// An order with all of its lines.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithLines {
    #[serde(flatten)]
    pub order: Order,
    pub lines: Vec<OrderLineView>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    id: String,
    product_id: String,
    product_name: String,
    quantity: i64,
    price_per_day_cents: i64,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl OrderLineRow {
    fn into_view(self) -> DbResult<OrderLineView> {
        let item_total = pricing::line_total(
            Money::from_cents(self.price_per_day_cents),
            self.start_date,
            self.end_date,
            self.quantity,
        )
        .map_err(DbError::Domain)?;

        Ok(OrderLineView {
            id: self.id,
            product_id: self.product_id,
            product_name: self.product_name,
            quantity: self.quantity,
            price_per_day_cents: self.price_per_day_cents,
            start_date: self.start_date,
            end_date: self.end_date,
            item_total_cents: item_total.cents(),
        })
    }
}

const ORDER_COLUMNS: &str = r#"
    id, user_id, status, total_price_cents,
    first_name, last_name, email, phone,
    billing_address, billing_city, billing_state, billing_zip,
    payment_reference, created_at, updated_at
"#;

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Assembles and persists an order from line requests.
    ///
    /// ## Algorithm
    /// 1. Per line: resolve the product, validate quantity and date order,
    ///    freeze the current daily rate, compute the line total
    /// 2. Sum line totals into the frozen order total
    /// 3. Write the header and every line in ONE transaction
    ///
    /// A failure on any line rolls the whole order back; there is no such
    /// thing as a partially persisted order.
    ///
    /// Availability is deliberately neither checked nor mutated here: the
    /// source system only restores availability on cancellation.
    pub async fn create(&self, caller: &Caller, new_order: NewOrder) -> DbResult<OrderWithLines> {
        if new_order.lines.is_empty() {
            return Err(CoreError::from(ValidationError::Required {
                field: "order_items_data".to_string(),
            })
            .into());
        }

        let order_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let mut total = Money::zero();
        let mut lines: Vec<OrderLine> = Vec::with_capacity(new_order.lines.len());

        for request in &new_order.lines {
            validation::validate_reference("product_id", &request.product_id)
                .map_err(CoreError::from)?;
            validation::validate_quantity(request.quantity).map_err(CoreError::from)?;

            let product = sqlx::query_as::<_, Product>(
                r#"
                SELECT
                    id, shop_id, name, description,
                    price_per_day_cents, available,
                    created_at, updated_at
                FROM products
                WHERE id = ?1
                "#,
            )
            .bind(&request.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(request.product_id.clone()))?;

            if request.end_date < request.start_date {
                return Err(CoreError::OrderLineDateRange {
                    product_id: product.id,
                    start: request.start_date,
                    end: request.end_date,
                }
                .into());
            }

            let item_total = pricing::line_total(
                product.price_per_day(),
                request.start_date,
                request.end_date,
                request.quantity,
            )
            .map_err(DbError::Domain)?;
            total += item_total;

            lines.push(OrderLine {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                product_id: product.id,
                quantity: request.quantity,
                price_per_day_cents: product.price_per_day_cents,
                start_date: request.start_date,
                end_date: request.end_date,
                created_at: now,
            });
        }

        let billing = &new_order.billing;
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, status, total_price_cents,
                first_name, last_name, email, phone,
                billing_address, billing_city, billing_state, billing_zip,
                payment_reference, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6, ?7, ?8,
                ?9, ?10, ?11, ?12,
                ?13, ?14, ?14
            )
            "#,
        )
        .bind(&order_id)
        .bind(&caller.user_id)
        .bind(OrderStatus::AwaitingConfirmation)
        .bind(total.cents())
        .bind(&billing.first_name)
        .bind(&billing.last_name)
        .bind(&billing.email)
        .bind(&billing.phone)
        .bind(&billing.billing_address)
        .bind(&billing.billing_city)
        .bind(&billing.billing_state)
        .bind(&billing.billing_zip)
        .bind(&billing.payment_reference)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for line in &lines {
            sqlx::query(
                r#"
                INSERT INTO order_lines (
                    id, order_id, product_id, quantity,
                    price_per_day_cents, start_date, end_date, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&line.id)
            .bind(&line.order_id)
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(line.price_per_day_cents)
            .bind(line.start_date)
            .bind(line.end_date)
            .bind(line.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            order_id = %order_id,
            user_id = %caller.user_id,
            total_cents = %total.cents(),
            lines = lines.len(),
            "Order created"
        );

        self.get_with_lines(&order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", &order_id))
    }

    /// Lists orders visible to the caller, newest first.
    ///
    /// The scope decision is pure ([`visibility::list_scope`]); this method
    /// resolves the caller's owned shop and runs the matching query.
    pub async fn list(
        &self,
        caller: &Caller,
        shop_filter: Option<&str>,
    ) -> DbResult<Vec<OrderWithLines>> {
        let owned_shop_id = if caller.is_admin() {
            None
        } else {
            sqlx::query_scalar::<_, String>("SELECT id FROM shops WHERE owner_id = ?1")
                .bind(&caller.user_id)
                .fetch_optional(&self.pool)
                .await?
        };

        let scope = visibility::list_scope(caller, shop_filter, owned_shop_id.as_deref());

        let orders: Vec<Order> = match &scope {
            OrderListScope::All => {
                sqlx::query_as::<_, Order>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id"
                ))
                .fetch_all(&self.pool)
                .await?
            }
            OrderListScope::Shop(shop_id) => {
                sqlx::query_as::<_, Order>(&format!(
                    r#"
                    SELECT {ORDER_COLUMNS} FROM orders o
                    WHERE EXISTS (
                        SELECT 1 FROM order_lines ol
                        JOIN products p ON p.id = ol.product_id
                        WHERE ol.order_id = o.id AND p.shop_id = ?1
                    )
                    ORDER BY created_at DESC, id
                    "#
                ))
                .bind(shop_id)
                .fetch_all(&self.pool)
                .await?
            }
            OrderListScope::Own(user_id) => {
                sqlx::query_as::<_, Order>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ?1 ORDER BY created_at DESC, id"
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            OrderListScope::Empty => Vec::new(),
        };

        debug!(scope = ?scope, count = orders.len(), "Listed orders");

        let mut result = Vec::with_capacity(orders.len());
        for order in orders {
            let lines = self.lines_for_order(&order.id).await?;
            result.push(OrderWithLines { order, lines });
        }

        Ok(result)
    }

    /// Gets one order if it is inside the caller's visibility set.
    ///
    /// Returns `Ok(None)` both for a missing order and for one the caller
    /// may not see — the two must be indistinguishable.
    pub async fn get_visible(
        &self,
        caller: &Caller,
        order_id: &str,
    ) -> DbResult<Option<OrderWithLines>> {
        let Some(order) = self.fetch_order(order_id).await? else {
            return Ok(None);
        };

        if !self.caller_can_view(caller, &order).await? {
            return Ok(None);
        }

        let lines = self.lines_for_order(&order.id).await?;
        Ok(Some(OrderWithLines { order, lines }))
    }

    /// Cancels an order on behalf of its owning customer.
    ///
    /// ## Authorization
    /// - Outside the visibility set → not-found (no existence leak)
    /// - Visible but not the owner (admin, shop owner) → permission error
    ///
    /// ## Transition
    /// Allowed only from `awaiting_confirmation` or `confirmed`; the guard
    /// is re-checked inside the UPDATE so a concurrent transition cannot
    /// slip through. Status write and availability restore share one
    /// transaction: both happen or neither does.
    pub async fn cancel(&self, caller: &Caller, order_id: &str) -> DbResult<OrderWithLines> {
        let Some(order) = self.fetch_order(order_id).await? else {
            return Err(CoreError::OrderNotFound(order_id.to_string()).into());
        };

        if !self.caller_can_view(caller, &order).await? {
            return Err(CoreError::OrderNotFound(order_id.to_string()).into());
        }

        if !visibility::can_cancel_order(caller, order.owner_id()) {
            return Err(CoreError::NotOrderOwner {
                order_id: order_id.to_string(),
            }
            .into());
        }

        if !order.status.can_cancel() {
            return Err(CoreError::InvalidStatusTransition {
                order_id: order_id.to_string(),
                current_status: order.status.to_string(),
            }
            .into());
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'cancelled', updated_at = ?2
            WHERE id = ?1 AND status IN ('awaiting_confirmation', 'confirmed')
            "#,
        )
        .bind(order_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            // Lost a race against another transition; report current state.
            drop(tx);
            let current = self
                .fetch_order(order_id)
                .await?
                .map(|o| o.status.to_string())
                .unwrap_or_else(|| "missing".to_string());
            return Err(CoreError::InvalidStatusTransition {
                order_id: order_id.to_string(),
                current_status: current,
            }
            .into());
        }

        // Best-effort availability restore: a boolean flip per product, not
        // stock accounting. Only products currently flagged unavailable are
        // touched.
        sqlx::query(
            r#"
            UPDATE products
            SET available = 1, updated_at = ?2
            WHERE available = 0
              AND id IN (SELECT product_id FROM order_lines WHERE order_id = ?1)
            "#,
        )
        .bind(order_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(order_id = %order_id, user_id = %caller.user_id, "Order cancelled");

        self.get_with_lines(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn fetch_order(&self, order_id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    async fn get_with_lines(&self, order_id: &str) -> DbResult<Option<OrderWithLines>> {
        let Some(order) = self.fetch_order(order_id).await? else {
            return Ok(None);
        };
        let lines = self.lines_for_order(&order.id).await?;
        Ok(Some(OrderWithLines { order, lines }))
    }

    async fn lines_for_order(&self, order_id: &str) -> DbResult<Vec<OrderLineView>> {
        let rows = sqlx::query_as::<_, OrderLineRow>(
            r#"
            SELECT
                ol.id, ol.product_id, p.name AS product_name,
                ol.quantity, ol.price_per_day_cents,
                ol.start_date, ol.end_date
            FROM order_lines ol
            JOIN products p ON p.id = ol.product_id
            WHERE ol.order_id = ?1
            ORDER BY ol.created_at, ol.id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OrderLineRow::into_view).collect()
    }

    /// Resolves the visibility facts for one order and applies the pure rule.
    async fn caller_can_view(&self, caller: &Caller, order: &Order) -> DbResult<bool> {
        // Cheap checks first; the shop join only runs when it can matter.
        if caller.is_admin() || caller.user_id == order.owner_id() {
            return Ok(true);
        }

        let shop_lines: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM order_lines ol
            JOIN products p ON p.id = ol.product_id
            JOIN shops s ON s.id = p.shop_id
            WHERE ol.order_id = ?1 AND s.owner_id = ?2
            "#,
        )
        .bind(&order.id)
        .bind(&caller.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(visibility::can_view_order(
            caller,
            order.owner_id(),
            shop_lines > 0,
        ))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::ProductRepository;
    use crate::repository::shop::ShopRepository;
    use rentiva_core::Shop;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_shop(db: &Database, owner_id: &str) -> Shop {
        let shop = ShopRepository::build(owner_id, "Test Shop");
        db.shops().insert(&shop).await.unwrap();
        shop
    }

    async fn seed_product(db: &Database, shop_id: &str, price_per_day_cents: i64) -> Product {
        let product = ProductRepository::build(shop_id, "Test Product", price_per_day_cents);
        db.products().insert(&product).await.unwrap();
        product
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn line(product_id: &str, quantity: i64, start: NaiveDate, end: NaiveDate) -> OrderLineRequest {
        OrderLineRequest {
            product_id: product_id.to_string(),
            quantity,
            start_date: start,
            end_date: end,
        }
    }

    fn new_order(lines: Vec<OrderLineRequest>) -> NewOrder {
        NewOrder {
            billing: BillingDetails {
                first_name: "Ava".to_string(),
                email: "ava@example.com".to_string(),
                ..Default::default()
            },
            lines,
        }
    }

    async fn force_status(db: &Database, order_id: &str, status: &str) {
        sqlx::query("UPDATE orders SET status = ?2 WHERE id = ?1")
            .bind(order_id)
            .bind(status)
            .execute(db.pool())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_computes_frozen_total() {
        let db = test_db().await;
        let shop = seed_shop(&db, "shop-owner").await;
        let a = seed_product(&db, &shop.id, 5000).await; // $50.00/day
        let b = seed_product(&db, &shop.id, 3000).await; // $30.00/day

        let caller = Caller::customer("user-1");
        let (start, end) = (date(2025, 6, 1), date(2025, 6, 3)); // 3 days

        let order = db
            .orders()
            .create(
                &caller,
                new_order(vec![line(&a.id, 1, start, end), line(&b.id, 2, start, end)]),
            )
            .await
            .unwrap();

        // $150.00 + $180.00 = $330.00
        assert_eq!(order.order.total_price_cents, 33000);
        assert_eq!(order.order.status, OrderStatus::AwaitingConfirmation);
        assert_eq!(order.order.user_id, "user-1");
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.lines[0].item_total_cents, 15000);
        assert_eq!(order.lines[1].item_total_cents, 18000);
        assert_eq!(order.lines[1].price_per_day_cents, 3000);
    }

    #[tokio::test]
    async fn test_order_totals_survive_price_changes() {
        let db = test_db().await;
        let shop = seed_shop(&db, "shop-owner").await;
        let product = seed_product(&db, &shop.id, 5000).await;

        let caller = Caller::customer("user-1");
        let order = db
            .orders()
            .create(
                &caller,
                new_order(vec![line(&product.id, 1, date(2025, 6, 1), date(2025, 6, 3))]),
            )
            .await
            .unwrap();
        assert_eq!(order.order.total_price_cents, 15000);

        // Doubling the product price must not touch the placed order.
        db.products()
            .update_price(&product.id, 10000)
            .await
            .unwrap();

        let reread = db
            .orders()
            .get_visible(&caller, &order.order.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reread.order.total_price_cents, 15000);
        assert_eq!(reread.lines[0].price_per_day_cents, 5000);
        assert_eq!(reread.lines[0].item_total_cents, 15000);
    }

    #[tokio::test]
    async fn test_create_is_atomic_across_lines() {
        let db = test_db().await;
        let shop = seed_shop(&db, "shop-owner").await;
        let product = seed_product(&db, &shop.id, 5000).await;

        let caller = Caller::customer("user-1");
        let err = db
            .orders()
            .create(
                &caller,
                new_order(vec![
                    line(&product.id, 1, date(2025, 6, 1), date(2025, 6, 3)),
                    line("missing-product", 1, date(2025, 6, 1), date(2025, 6, 3)),
                ]),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::ProductNotFound(_))
        ));

        // No partial order survived the rollback.
        let orders = db.orders().list(&caller, None).await.unwrap();
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_bad_lines() {
        let db = test_db().await;
        let shop = seed_shop(&db, "shop-owner").await;
        let product = seed_product(&db, &shop.id, 5000).await;
        let caller = Caller::customer("user-1");

        let err = db
            .orders()
            .create(&caller, new_order(vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));

        let err = db
            .orders()
            .create(
                &caller,
                new_order(vec![line(&product.id, 1, date(2025, 6, 3), date(2025, 6, 1))]),
            )
            .await
            .unwrap_err();
        match err {
            DbError::Domain(CoreError::OrderLineDateRange { product_id, .. }) => {
                assert_eq!(product_id, product.id);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = db
            .orders()
            .create(
                &caller,
                new_order(vec![line(&product.id, 0, date(2025, 6, 1), date(2025, 6, 3))]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_visibility_detail_access() {
        let db = test_db().await;
        let shop = seed_shop(&db, "shop-owner").await;
        let product = seed_product(&db, &shop.id, 5000).await;

        let placer = Caller::customer("user-1");
        let order = db
            .orders()
            .create(
                &placer,
                new_order(vec![line(&product.id, 1, date(2025, 6, 1), date(2025, 6, 3))]),
            )
            .await
            .unwrap();
        let order_id = order.order.id;

        // Placer and admin see it.
        assert!(db
            .orders()
            .get_visible(&placer, &order_id)
            .await
            .unwrap()
            .is_some());
        assert!(db
            .orders()
            .get_visible(&Caller::admin("staff-1"), &order_id)
            .await
            .unwrap()
            .is_some());

        // The owner of the shop behind the product sees it too.
        assert!(db
            .orders()
            .get_visible(&Caller::customer("shop-owner"), &order_id)
            .await
            .unwrap()
            .is_some());

        // An unrelated customer gets the same answer as for a missing id.
        assert!(db
            .orders()
            .get_visible(&Caller::customer("stranger"), &order_id)
            .await
            .unwrap()
            .is_none());
        assert!(db
            .orders()
            .get_visible(&placer, "no-such-order")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_scopes() {
        let db = test_db().await;
        let shop = seed_shop(&db, "shop-owner").await;
        let product = seed_product(&db, &shop.id, 5000).await;

        let other_shop = seed_shop(&db, "other-owner").await;
        let other_product = seed_product(&db, &other_shop.id, 2000).await;

        let buyer = Caller::customer("buyer");
        db.orders()
            .create(
                &buyer,
                new_order(vec![line(&product.id, 1, date(2025, 6, 1), date(2025, 6, 3))]),
            )
            .await
            .unwrap();
        db.orders()
            .create(
                &buyer,
                new_order(vec![line(
                    &other_product.id,
                    1,
                    date(2025, 6, 1),
                    date(2025, 6, 2),
                )]),
            )
            .await
            .unwrap();

        // Customers list their own orders.
        assert_eq!(db.orders().list(&buyer, None).await.unwrap().len(), 2);
        assert_eq!(
            db.orders()
                .list(&Caller::customer("stranger"), None)
                .await
                .unwrap()
                .len(),
            0
        );

        // A shop owner's default list is their own purchases, not their
        // shop's sales.
        let shop_owner = Caller::customer("shop-owner");
        assert_eq!(db.orders().list(&shop_owner, None).await.unwrap().len(), 0);

        // Filtering by their own shop shows the shop's orders.
        let shop_orders = db
            .orders()
            .list(&shop_owner, Some(&shop.id))
            .await
            .unwrap();
        assert_eq!(shop_orders.len(), 1);

        // Filtering by someone else's shop shows nothing.
        assert_eq!(
            db.orders()
                .list(&shop_owner, Some(&other_shop.id))
                .await
                .unwrap()
                .len(),
            0
        );

        // Admin: everything, or one shop when filtered.
        let admin = Caller::admin("staff-1");
        assert_eq!(db.orders().list(&admin, None).await.unwrap().len(), 2);
        assert_eq!(
            db.orders()
                .list(&admin, Some(&other_shop.id))
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_cancel_restores_unavailable_products() {
        let db = test_db().await;
        let shop = seed_shop(&db, "shop-owner").await;
        let product = seed_product(&db, &shop.id, 5000).await;

        let caller = Caller::customer("user-1");
        let order = db
            .orders()
            .create(
                &caller,
                new_order(vec![line(&product.id, 1, date(2025, 6, 1), date(2025, 6, 3))]),
            )
            .await
            .unwrap();

        // Cancellation is allowed from confirmed as well.
        force_status(&db, &order.order.id, "confirmed").await;
        db.products()
            .set_availability(&product.id, false)
            .await
            .unwrap();

        let cancelled = db.orders().cancel(&caller, &order.order.id).await.unwrap();
        assert_eq!(cancelled.order.status, OrderStatus::Cancelled);

        let product = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert!(product.available);
    }

    #[tokio::test]
    async fn test_cancel_gate_rejects_terminal_and_active_states() {
        let db = test_db().await;
        let shop = seed_shop(&db, "shop-owner").await;
        let product = seed_product(&db, &shop.id, 5000).await;
        let caller = Caller::customer("user-1");

        for status in ["active", "completed", "cancelled"] {
            let order = db
                .orders()
                .create(
                    &caller,
                    new_order(vec![line(&product.id, 1, date(2025, 6, 1), date(2025, 6, 3))]),
                )
                .await
                .unwrap();
            force_status(&db, &order.order.id, status).await;

            let err = db
                .orders()
                .cancel(&caller, &order.order.id)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                DbError::Domain(CoreError::InvalidStatusTransition { .. })
            ));

            // No state change on failure.
            let unchanged = db
                .orders()
                .get_visible(&caller, &order.order.id)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(unchanged.order.status.to_string(), status);
        }
    }

    #[tokio::test]
    async fn test_cancel_authorization() {
        let db = test_db().await;
        let shop = seed_shop(&db, "shop-owner").await;
        let product = seed_product(&db, &shop.id, 5000).await;

        let caller = Caller::customer("user-1");
        let order = db
            .orders()
            .create(
                &caller,
                new_order(vec![line(&product.id, 1, date(2025, 6, 1), date(2025, 6, 3))]),
            )
            .await
            .unwrap();
        let order_id = order.order.id;

        // Invisible caller: indistinguishable from a missing order.
        let err = db
            .orders()
            .cancel(&Caller::customer("stranger"), &order_id)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::OrderNotFound(_))));

        // Visible non-owners (shop owner, admin) are refused, not hidden.
        let err = db
            .orders()
            .cancel(&Caller::customer("shop-owner"), &order_id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::NotOrderOwner { .. })
        ));
        let err = db
            .orders()
            .cancel(&Caller::admin("staff-1"), &order_id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::NotOrderOwner { .. })
        ));

        // The owner succeeds.
        let cancelled = db.orders().cancel(&caller, &order_id).await.unwrap();
        assert_eq!(cancelled.order.status, OrderStatus::Cancelled);
    }
}
