//! # Error Types
//!
//! Domain-specific error types for rentiva-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  rentiva-core errors (this file)                                       │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  rentiva-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  HTTP API errors (in app)                                              │
//! │  └── ApiError         - What clients see (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, order id, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use chrono::NaiveDate;
use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Product exists but is not currently available for rent.
    ///
    /// ## When This Occurs
    /// - Adding an unavailable product to the cart
    /// - The availability flag is only restored by order cancellation
    #[error("Product {product_id} is not available for rent")]
    ProductUnavailable { product_id: String },

    /// Order cannot be found (or is outside the caller's visibility set,
    /// which must look identical to not existing).
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Cart line cannot be found in the caller's cart.
    #[error("Cart line not found: {0}")]
    CartLineNotFound(String),

    /// A rental period with the end date before the start date.
    #[error("end date {end} cannot be before start date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// An order line request with an inverted rental period.
    /// Names the offending product so multi-line checkouts stay debuggable.
    #[error("invalid rental period for product {product_id}: end date {end} cannot be before start date {start}")]
    OrderLineDateRange {
        product_id: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// Order is not in a state that allows the requested transition.
    ///
    /// ## When This Occurs
    /// - Cancelling an order that is already active, completed, or cancelled
    #[error("Order {order_id} is {current_status}, cannot be cancelled")]
    InvalidStatusTransition {
        order_id: String,
        current_status: String,
    },

    /// The caller can see the order but does not own it.
    /// Distinct from `OrderNotFound`: existence is already known here.
    #[error("Only the customer who placed order {order_id} may cancel it")]
    NotOrderOwner { order_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., a second cart line for the same exact range).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::ProductUnavailable {
            product_id: "prod-1".to_string(),
        };
        assert_eq!(err.to_string(), "Product prod-1 is not available for rent");

        let err = CoreError::InvalidStatusTransition {
            order_id: "ord-1".to_string(),
            current_status: "completed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Order ord-1 is completed, cannot be cancelled"
        );
    }

    #[test]
    fn test_date_range_message_names_product() {
        let err = CoreError::OrderLineDateRange {
            product_id: "prod-9".to_string(),
            start: NaiveDate::from_ymd_opt(2025, 7, 10).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 7, 5).unwrap(),
        };
        assert!(err.to_string().contains("prod-9"));
        assert!(err.to_string().contains("2025-07-05"));
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "product_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
