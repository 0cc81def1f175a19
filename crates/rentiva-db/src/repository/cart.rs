//! # Cart Repository
//!
//! Database operations for carts and cart lines.
//!
//! ## Exact-Range Merge
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │               Cart Line Consolidation                                   │
//! │                                                                         │
//! │  add(P, 2025-07-05..07, qty 1)  →  line A (qty 1)       "created"      │
//! │  add(P, 2025-07-05..07, qty 2)  →  line A (qty 3)       "merged"       │
//! │  add(P, 2025-07-06..08, qty 1)  →  line B (qty 1)       "created"      │
//! │                                                                         │
//! │  Lines merge ONLY on the exact (cart, product, start, end) key.        │
//! │  Overlapping-but-different ranges coexist as separate lines.           │
//! │                                                                         │
//! │  A UNIQUE index enforces at-most-one-row per key; the insert path      │
//! │  falls back to an additive ON CONFLICT update, so two racing adds      │
//! │  end as one merged row, never two rows or a failed request.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart lines carry no price. Subtotals are computed at read time from the
//! product's current daily rate; only placing an order freezes prices.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use rentiva_core::{pricing, validation, Cart, CoreError, Money};

// =============================================================================
// View Types
// =============================================================================

/// Whether an add call created a new line or merged into an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddLineOutcome {
    /// A new line was inserted.
    Created,
    /// An existing line's quantity was incremented.
    Merged,
}

/// One cart line joined with its product, priced at the current daily rate.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    /// Current daily rate of the product, in cents.
    pub price_per_day_cents: i64,
    pub quantity: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub added_at: chrono::DateTime<Utc>,
    /// price_per_day × rental_days × quantity, in cents.
    pub subtotal_cents: i64,
}

/// A cart with all lines and the aggregate total.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub id: String,
    pub user_id: String,
    pub lines: Vec<CartLineView>,
    /// Sum of all line subtotals, in cents.
    pub total_cents: i64,
}

/// Partial update for a cart line; absent fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct CartLineUpdate {
    pub quantity: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Raw joined row; priced into a [`CartLineView`] after fetching.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: String,
    product_id: String,
    product_name: String,
    price_per_day_cents: i64,
    quantity: i64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    added_at: chrono::DateTime<Utc>,
}

impl CartLineRow {
    /// Prices the row at the product's current daily rate.
    fn into_view(self) -> DbResult<CartLineView> {
        let subtotal = pricing::line_total(
            Money::from_cents(self.price_per_day_cents),
            self.start_date,
            self.end_date,
            self.quantity,
        )
        .map_err(DbError::Domain)?;

        Ok(CartLineView {
            id: self.id,
            product_id: self.product_id,
            product_name: self.product_name,
            price_per_day_cents: self.price_per_day_cents,
            quantity: self.quantity,
            start_date: self.start_date,
            end_date: self.end_date,
            added_at: self.added_at,
            subtotal_cents: subtotal.cents(),
        })
    }
}

/// A cart line joined with its owning cart, for ownership checks.
#[derive(Debug, sqlx::FromRow)]
struct OwnedLineRow {
    id: String,
    quantity: i64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    user_id: String,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for cart database operations.
///
/// Every method takes the calling user's id; lines belonging to other
/// users' carts behave exactly as if they did not exist.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Gets the user's cart, creating it on first access.
    ///
    /// ## Concurrency
    /// Two racing first accesses both succeed: the insert ignores a
    /// concurrent winner via the UNIQUE(user_id) constraint and re-reads.
    pub async fn get_or_create(&self, user_id: &str) -> DbResult<Cart> {
        if let Some(cart) = self.find_by_user(user_id).await? {
            return Ok(cart);
        }

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        debug!(user_id = %user_id, cart_id = %id, "Creating cart on first access");

        sqlx::query(
            r#"
            INSERT INTO carts (id, user_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            ON CONFLICT(user_id) DO NOTHING
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_by_user(user_id)
            .await?
            .ok_or_else(|| DbError::Internal(format!("cart for {user_id} vanished after insert")))
    }

    async fn find_by_user(&self, user_id: &str) -> DbResult<Option<Cart>> {
        let cart = sqlx::query_as::<_, Cart>(
            r#"
            SELECT id, user_id, created_at, updated_at
            FROM carts
            WHERE user_id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cart)
    }

    /// Adds a product to the user's cart for a rental period.
    ///
    /// ## Behavior
    /// - Product must exist and be available
    /// - `end ≥ start`, `quantity ≥ 1`
    /// - A line with the same exact (product, start, end) key is merged by
    ///   summing quantities; anything else creates a new line
    ///
    /// ## Returns
    /// The resulting line plus whether it was created or merged, so the
    /// HTTP layer can answer 201 vs 200.
    pub async fn add_line(
        &self,
        user_id: &str,
        product_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        quantity: i64,
    ) -> DbResult<(CartLineView, AddLineOutcome)> {
        validation::validate_reference("product_id", product_id).map_err(CoreError::from)?;
        validation::validate_quantity(quantity).map_err(CoreError::from)?;
        pricing::rental_days(start_date, end_date).map_err(DbError::Domain)?;

        let product = sqlx::query_as::<_, rentiva_core::Product>(
            r#"
            SELECT
                id, shop_id, name, description,
                price_per_day_cents, available,
                created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        if !product.available {
            return Err(CoreError::ProductUnavailable {
                product_id: product.id,
            }
            .into());
        }

        let cart = self.get_or_create(user_id).await?;
        let now = Utc::now();

        // Exact-key lookup; adjacent or overlapping ranges never match.
        let existing: Option<String> = sqlx::query_scalar(
            r#"
            SELECT id FROM cart_lines
            WHERE cart_id = ?1 AND product_id = ?2
              AND start_date = ?3 AND end_date = ?4
            "#,
        )
        .bind(&cart.id)
        .bind(product_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_optional(&self.pool)
        .await?;

        let outcome = match existing {
            Some(line_id) => {
                debug!(line_id = %line_id, quantity = %quantity, "Merging into existing cart line");

                sqlx::query("UPDATE cart_lines SET quantity = quantity + ?2 WHERE id = ?1")
                    .bind(&line_id)
                    .bind(quantity)
                    .execute(&self.pool)
                    .await?;

                AddLineOutcome::Merged
            }
            None => {
                let line_id = Uuid::new_v4().to_string();
                debug!(line_id = %line_id, product_id = %product_id, "Creating cart line");

                // The conflict arm absorbs a racing insert on the same key:
                // the quantities sum instead of a second row appearing.
                sqlx::query(
                    r#"
                    INSERT INTO cart_lines (
                        id, cart_id, product_id, quantity,
                        start_date, end_date, added_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    ON CONFLICT(cart_id, product_id, start_date, end_date)
                    DO UPDATE SET quantity = quantity + excluded.quantity
                    "#,
                )
                .bind(&line_id)
                .bind(&cart.id)
                .bind(product_id)
                .bind(quantity)
                .bind(start_date)
                .bind(end_date)
                .bind(now)
                .execute(&self.pool)
                .await?;

                AddLineOutcome::Created
            }
        };

        self.touch(&cart.id).await?;

        // Re-read by key: under a conflict-merge the surviving row keeps
        // the original id, not the one we just generated.
        let line_id: String = sqlx::query_scalar(
            r#"
            SELECT id FROM cart_lines
            WHERE cart_id = ?1 AND product_id = ?2
              AND start_date = ?3 AND end_date = ?4
            "#,
        )
        .bind(&cart.id)
        .bind(product_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.pool)
        .await?;

        let view = self.fetch_line_view(&line_id).await?;
        Ok((view, outcome))
    }

    /// Updates quantity and/or dates of a line in the caller's cart.
    ///
    /// Absent fields keep their stored values; the merged result is
    /// revalidated (positive quantity, `end ≥ start`). A foreign line is
    /// indistinguishable from a missing one.
    pub async fn update_line(
        &self,
        user_id: &str,
        line_id: &str,
        update: CartLineUpdate,
    ) -> DbResult<CartLineView> {
        let line = self.owned_line(user_id, line_id).await?;

        let quantity = update.quantity.unwrap_or(line.quantity);
        let start_date = update.start_date.unwrap_or(line.start_date);
        let end_date = update.end_date.unwrap_or(line.end_date);

        validation::validate_quantity(quantity).map_err(CoreError::from)?;
        pricing::rental_days(start_date, end_date).map_err(DbError::Domain)?;

        debug!(line_id = %line_id, quantity = %quantity, "Updating cart line");

        sqlx::query(
            r#"
            UPDATE cart_lines
            SET quantity = ?2, start_date = ?3, end_date = ?4
            WHERE id = ?1
            "#,
        )
        .bind(&line.id)
        .bind(quantity)
        .bind(start_date)
        .bind(end_date)
        .execute(&self.pool)
        .await?;

        self.fetch_line_view(&line.id).await
    }

    /// Removes a line from the caller's cart.
    pub async fn remove_line(&self, user_id: &str, line_id: &str) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM cart_lines
            WHERE id = ?1
              AND cart_id IN (SELECT id FROM carts WHERE user_id = ?2)
            "#,
        )
        .bind(line_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::CartLineNotFound(line_id.to_string()).into());
        }

        debug!(line_id = %line_id, "Removed cart line");
        Ok(())
    }

    /// Deletes all lines from the caller's cart.
    ///
    /// Idempotent: clearing an empty (or not-yet-created) cart succeeds.
    ///
    /// ## Returns
    /// The number of lines removed, so callers can distinguish "cleared"
    /// from "was already empty".
    pub async fn clear(&self, user_id: &str) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM cart_lines
            WHERE cart_id IN (SELECT id FROM carts WHERE user_id = ?1)
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        let removed = result.rows_affected();
        debug!(user_id = %user_id, removed = %removed, "Cleared cart");

        Ok(removed)
    }

    /// Returns the user's cart with all lines and the aggregate total,
    /// creating the cart on first access.
    pub async fn get_view(&self, user_id: &str) -> DbResult<CartView> {
        let cart = self.get_or_create(user_id).await?;

        let rows = sqlx::query_as::<_, CartLineRow>(
            r#"
            SELECT
                cl.id, cl.product_id, p.name AS product_name,
                p.price_per_day_cents, cl.quantity,
                cl.start_date, cl.end_date, cl.added_at
            FROM cart_lines cl
            JOIN products p ON p.id = cl.product_id
            WHERE cl.cart_id = ?1
            ORDER BY cl.added_at, cl.id
            "#,
        )
        .bind(&cart.id)
        .fetch_all(&self.pool)
        .await?;

        let mut lines = Vec::with_capacity(rows.len());
        let mut total = Money::zero();
        for row in rows {
            let view = row.into_view()?;
            total += Money::from_cents(view.subtotal_cents);
            lines.push(view);
        }

        Ok(CartView {
            id: cart.id,
            user_id: cart.user_id,
            lines,
            total_cents: total.cents(),
        })
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn touch(&self, cart_id: &str) -> DbResult<()> {
        sqlx::query("UPDATE carts SET updated_at = ?2 WHERE id = ?1")
            .bind(cart_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Fetches a line verifying it belongs to the caller's cart.
    async fn owned_line(&self, user_id: &str, line_id: &str) -> DbResult<OwnedLineRow> {
        let line = sqlx::query_as::<_, OwnedLineRow>(
            r#"
            SELECT cl.id, cl.quantity, cl.start_date, cl.end_date, c.user_id
            FROM cart_lines cl
            JOIN carts c ON c.id = cl.cart_id
            WHERE cl.id = ?1
            "#,
        )
        .bind(line_id)
        .fetch_optional(&self.pool)
        .await?;

        match line {
            Some(line) if line.user_id == user_id => Ok(line),
            // A foreign line must look exactly like a missing one.
            _ => Err(CoreError::CartLineNotFound(line_id.to_string()).into()),
        }
    }

    async fn fetch_line_view(&self, line_id: &str) -> DbResult<CartLineView> {
        let row = sqlx::query_as::<_, CartLineRow>(
            r#"
            SELECT
                cl.id, cl.product_id, p.name AS product_name,
                p.price_per_day_cents, cl.quantity,
                cl.start_date, cl.end_date, cl.added_at
            FROM cart_lines cl
            JOIN products p ON p.id = cl.product_id
            WHERE cl.id = ?1
            "#,
        )
        .bind(line_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CoreError::CartLineNotFound(line_id.to_string()))?;

        row.into_view()
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
    use rentiva_core::Product;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(db: &Database, price_per_day_cents: i64) -> Product {
        let shop = ShopRepository::build(&format!("owner-{}", Uuid::new_v4()), "Test Shop");
        db.shops().insert(&shop).await.unwrap();
        let product = ProductRepository::build(&shop.id, "Test Product", price_per_day_cents);
        db.products().insert(&product).await.unwrap();
        product
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_get_or_create_is_lazy_and_stable() {
        let db = test_db().await;

        let first = db.carts().get_or_create("user-1").await.unwrap();
        let second = db.carts().get_or_create("user-1").await.unwrap();
        assert_eq!(first.id, second.id);

        let other = db.carts().get_or_create("user-2").await.unwrap();
        assert_ne!(first.id, other.id);
    }

    #[tokio::test]
    async fn test_add_same_exact_range_merges_into_one_line() {
        let db = test_db().await;
        let product = seed_product(&db, 1500).await;
        let (start, end) = (date(2025, 7, 5), date(2025, 7, 7));

        let (line, outcome) = db
            .carts()
            .add_line("user-1", &product.id, start, end, 1)
            .await
            .unwrap();
        assert_eq!(outcome, AddLineOutcome::Created);
        assert_eq!(line.quantity, 1);

        let (merged, outcome) = db
            .carts()
            .add_line("user-1", &product.id, start, end, 2)
            .await
            .unwrap();
        assert_eq!(outcome, AddLineOutcome::Merged);
        assert_eq!(merged.id, line.id);
        assert_eq!(merged.quantity, 3);

        let view = db.carts().get_view("user-1").await.unwrap();
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_overlapping_ranges_stay_separate_lines() {
        let db = test_db().await;
        let product = seed_product(&db, 1500).await;

        db.carts()
            .add_line("user-1", &product.id, date(2025, 7, 5), date(2025, 7, 7), 1)
            .await
            .unwrap();
        db.carts()
            .add_line("user-1", &product.id, date(2025, 7, 6), date(2025, 7, 8), 1)
            .await
            .unwrap();

        let view = db.carts().get_view("user-1").await.unwrap();
        assert_eq!(view.lines.len(), 2);
    }

    #[tokio::test]
    async fn test_add_rejects_unavailable_product() {
        let db = test_db().await;
        let product = seed_product(&db, 1500).await;
        db.products()
            .set_availability(&product.id, false)
            .await
            .unwrap();

        let err = db
            .carts()
            .add_line("user-1", &product.id, date(2025, 7, 5), date(2025, 7, 7), 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::ProductUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_add_rejects_unknown_product_and_bad_input() {
        let db = test_db().await;
        let product = seed_product(&db, 1500).await;

        let err = db
            .carts()
            .add_line("user-1", "missing", date(2025, 7, 5), date(2025, 7, 7), 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::ProductNotFound(_))
        ));

        let err = db
            .carts()
            .add_line("user-1", &product.id, date(2025, 7, 7), date(2025, 7, 5), 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvalidDateRange { .. })
        ));

        let err = db
            .carts()
            .add_line("user-1", &product.id, date(2025, 7, 5), date(2025, 7, 7), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_cart_totals_use_current_price() {
        let db = test_db().await;
        let product = seed_product(&db, 5000).await;

        // $50.00/day × 3 days × 1 = $150.00
        db.carts()
            .add_line("user-1", &product.id, date(2025, 6, 1), date(2025, 6, 3), 1)
            .await
            .unwrap();

        let view = db.carts().get_view("user-1").await.unwrap();
        assert_eq!(view.total_cents, 15000);

        // Carts re-price on read: a price change shows up immediately.
        db.products().update_price(&product.id, 6000).await.unwrap();
        let view = db.carts().get_view("user-1").await.unwrap();
        assert_eq!(view.total_cents, 18000);
    }

    #[tokio::test]
    async fn test_update_line_is_owner_scoped_and_revalidates() {
        let db = test_db().await;
        let product = seed_product(&db, 1500).await;

        let (line, _) = db
            .carts()
            .add_line("user-1", &product.id, date(2025, 7, 5), date(2025, 7, 7), 1)
            .await
            .unwrap();

        // Another user cannot even see the line.
        let err = db
            .carts()
            .update_line(
                "user-2",
                &line.id,
                CartLineUpdate {
                    quantity: Some(5),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::CartLineNotFound(_))
        ));

        // Date update that inverts the range is rejected.
        let err = db
            .carts()
            .update_line(
                "user-1",
                &line.id,
                CartLineUpdate {
                    end_date: Some(date(2025, 7, 1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvalidDateRange { .. })
        ));

        // Valid quantity update sticks.
        let updated = db
            .carts()
            .update_line(
                "user-1",
                &line.id,
                CartLineUpdate {
                    quantity: Some(4),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.quantity, 4);
    }

    #[tokio::test]
    async fn test_remove_line_is_owner_scoped() {
        let db = test_db().await;
        let product = seed_product(&db, 1500).await;

        let (line, _) = db
            .carts()
            .add_line("user-1", &product.id, date(2025, 7, 5), date(2025, 7, 7), 1)
            .await
            .unwrap();

        let err = db.carts().remove_line("user-2", &line.id).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::CartLineNotFound(_))
        ));

        db.carts().remove_line("user-1", &line.id).await.unwrap();
        let view = db.carts().get_view("user-1").await.unwrap();
        assert!(view.lines.is_empty());
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let db = test_db().await;
        let product = seed_product(&db, 1500).await;

        db.carts()
            .add_line("user-1", &product.id, date(2025, 7, 5), date(2025, 7, 7), 1)
            .await
            .unwrap();

        let removed = db.carts().clear("user-1").await.unwrap();
        assert_eq!(removed, 1);

        // Clearing an already-empty cart succeeds and reports nothing removed.
        let removed = db.carts().clear("user-1").await.unwrap();
        assert_eq!(removed, 0);

        // Even for a user whose cart was never created.
        let removed = db.carts().clear("user-never-seen").await.unwrap();
        assert_eq!(removed, 0);
    }
}
