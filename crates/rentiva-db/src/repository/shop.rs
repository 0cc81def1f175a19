//! # Shop Repository
//!
//! Database operations for shops.
//!
//! Shop CRUD belongs to the wider platform; this repository exists because
//! order visibility flows through product → shop → owner, and because the
//! ownership lookup must come from current data rather than token claims.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use rentiva_core::Shop;

/// Repository for shop database operations.
#[derive(Debug, Clone)]
pub struct ShopRepository {
    pool: SqlitePool,
}

impl ShopRepository {
    /// Creates a new ShopRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShopRepository { pool }
    }

    /// Gets a shop by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Shop>> {
        let shop = sqlx::query_as::<_, Shop>(
            r#"
            SELECT id, owner_id, name, created_at
            FROM shops
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shop)
    }

    /// Gets the shop owned by a user, if any. One shop per owner.
    pub async fn find_by_owner(&self, owner_id: &str) -> DbResult<Option<Shop>> {
        let shop = sqlx::query_as::<_, Shop>(
            r#"
            SELECT id, owner_id, name, created_at
            FROM shops
            WHERE owner_id = ?1
            "#,
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shop)
    }

    /// Inserts a new shop.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - the owner already has a shop
    pub async fn insert(&self, shop: &Shop) -> DbResult<()> {
        debug!(id = %shop.id, owner_id = %shop.owner_id, "Inserting shop");

        sqlx::query(
            r#"
            INSERT INTO shops (id, owner_id, name, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&shop.id)
        .bind(&shop.owner_id)
        .bind(&shop.name)
        .bind(shop.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Builds a shop value with a fresh id and timestamp.
    pub fn build(owner_id: &str, name: &str) -> Shop {
        Shop {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }
}
