//! # Repository Module
//!
//! Database repository implementations for Rentiva.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  HTTP Handler                                                          │
//! │       │                                                                 │
//! │       │  db.carts().add_line(user, product, start, end, qty)           │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  CartRepository                                                        │
//! │  ├── get_view(&self, user_id)                                          │
//! │  ├── add_line(&self, user_id, ...)                                     │
//! │  ├── update_line(&self, user_id, line_id, update)                      │
//! │  └── clear(&self, user_id)                                             │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • SQL is isolated in one place                                        │
//! │  • Ownership scoping lives next to the queries it guards               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`shop::ShopRepository`] - Shop lookups and ownership resolution
//! - [`product::ProductRepository`] - Product CRUD and availability
//! - [`cart::CartRepository`] - Cart lines with exact-range consolidation
//! - [`order::OrderRepository`] - Order assembly, visibility, cancellation

pub mod cart;
pub mod order;
pub mod product;
pub mod shop;
