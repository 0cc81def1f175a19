//! # rentiva-db: Database Layer for Rentiva
//!
//! This crate provides database access for the Rentiva rental marketplace.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (cart, order, product, shop)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rentiva_db::{Database, DbConfig};
//!
//! // Create database with default config (runs migrations)
//! let db = Database::new(DbConfig::new("path/to/rentiva.db")).await?;
//!
//! // Use repositories
//! let cart = db.carts().get_view("user-1").await?;
//! let orders = db.orders().list(&caller, None).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::cart::{AddLineOutcome, CartLineUpdate, CartLineView, CartRepository, CartView};
pub use repository::order::{
    BillingDetails, NewOrder, OrderLineRequest, OrderLineView, OrderRepository, OrderWithLines,
};
pub use repository::product::ProductRepository;
pub use repository::shop::ShopRepository;
