//! # rentiva-core: Pure Business Logic for Rentiva
//!
//! This crate is the **heart** of Rentiva, a rental marketplace backend.
//! It contains all business logic as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Rentiva Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (axum)                              │   │
//! │  │    GET /cart ──► POST /cart-items ──► POST /orders ──► cancel  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ rentiva-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐ │   │
//! │  │   │   types   │  │   money   │  │  pricing   │  │visibility │ │   │
//! │  │   │  Product  │  │   Money   │  │rental_days │  │list scope │ │   │
//! │  │   │   Order   │  │  (cents)  │  │line_total  │  │can_cancel │ │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    rentiva-db (Database Layer)                  │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Cart, Order, Caller, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Inclusive rental-day counting and line totals
//! - [`visibility`] - Who may see and act on which orders
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Identity**: Every operation takes the caller as a parameter;
//!    there is no ambient "current user"
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rentiva_core::money::Money;
//! use rentiva_core::pricing::line_total;
//!
//! // $50.00/day for an inclusive three-day rental
//! let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
//!
//! let total = line_total(Money::from_cents(5000), start, end, 1).unwrap();
//! assert_eq!(total.cents(), 15000); // $150.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;
pub mod visibility;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use rentiva_core::Money` instead of
// `use rentiva_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;
pub use visibility::OrderListScope;
