//! # Product Repository
//!
//! Database operations for rentable products.
//!
//! ## Availability
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Who touches `available`?                                │
//! │                                                                         │
//! │  Cart add          reads it (rejects unavailable products)             │
//! │  Order creation    does NOT read or write it                           │
//! │  Order cancel      writes it (restores unavailable → available)        │
//! │  Shop tooling      writes it (listing management, external)            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use rentiva_core::Product;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
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
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists the products of one shop, newest first.
    pub async fn list_by_shop(&self, shop_id: &str) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, shop_id, name, description,
                price_per_day_cents, available,
                created_at, updated_at
            FROM products
            WHERE shop_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, shop_id = %product.shop_id, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, shop_id, name, description,
                price_per_day_cents, available,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.shop_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_per_day_cents)
        .bind(product.available)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a product's daily rate.
    ///
    /// Orders are unaffected: their lines carry a frozen snapshot.
    pub async fn update_price(&self, id: &str, price_per_day_cents: i64) -> DbResult<()> {
        debug!(id = %id, price_per_day_cents = %price_per_day_cents, "Updating product price");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET price_per_day_cents = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(price_per_day_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Sets a product's availability flag.
    ///
    /// ## When To Call
    /// Shop-side listing management. The order cancellation path flips the
    /// flag itself, inside the cancellation transaction.
    pub async fn set_availability(&self, id: &str, available: bool) -> DbResult<()> {
        debug!(id = %id, available = %available, "Setting product availability");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET available = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(available)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Builds a product value with a fresh id and timestamps.
    pub fn build(shop_id: &str, name: &str, price_per_day_cents: i64) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            shop_id: shop_id.to_string(),
            name: name.to_string(),
            description: None,
            price_per_day_cents,
            available: true,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::shop::ShopRepository;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;

        let shop = ShopRepository::build("user-1", "Camera Rentals");
        db.shops().insert(&shop).await.unwrap();

        let product = ProductRepository::build(&shop.id, "DSLR Kit", 5000);
        db.products().insert(&product).await.unwrap();

        let found = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(found.name, "DSLR Kit");
        assert_eq!(found.price_per_day_cents, 5000);
        assert!(found.available);

        assert!(db.products().get_by_id("missing").await.unwrap().is_none());

        let listed = db.products().list_by_shop(&shop.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, product.id);
    }

    #[tokio::test]
    async fn test_set_availability() {
        let db = test_db().await;

        let shop = ShopRepository::build("user-1", "Camera Rentals");
        db.shops().insert(&shop).await.unwrap();
        let product = ProductRepository::build(&shop.id, "Tripod", 800);
        db.products().insert(&product).await.unwrap();

        db.products()
            .set_availability(&product.id, false)
            .await
            .unwrap();

        let found = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert!(!found.available);

        let err = db
            .products()
            .set_availability("missing", true)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_one_shop_per_owner() {
        let db = test_db().await;

        let shop = ShopRepository::build("user-1", "First Shop");
        db.shops().insert(&shop).await.unwrap();

        let second = ShopRepository::build("user-1", "Second Shop");
        let err = db.shops().insert(&second).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        let owned = db.shops().find_by_owner("user-1").await.unwrap().unwrap();
        assert_eq!(owned.name, "First Shop");
    }
}
