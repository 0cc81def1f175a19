//! # Rental Pricing
//!
//! Pure pricing math for date-ranged rentals.
//!
//! ## Day Counting
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RENTAL DAYS ARE INCLUSIVE ON BOTH ENDS                                 │
//! │                                                                         │
//! │  [2025-06-01 .. 2025-06-03]  →  Jun 1, Jun 2, Jun 3  →  3 days         │
//! │  [2025-06-01 .. 2025-06-01]  →  Jun 1               →  1 day           │
//! │  [2025-06-03 .. 2025-06-01]  →  invalid range (end before start)       │
//! │                                                                         │
//! │  line_total = price_per_day × rental_days × quantity                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every money amount that reaches an order flows through [`line_total`],
//! both when pricing cart views and when freezing order lines at checkout.

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

/// Counts inclusive rental days in `[start, end]`.
///
/// ## Rules
/// - `end` equal to `start` counts as 1 rental day
/// - Result is always ≥ 1 for a valid range
/// - `end` before `start` is an `InvalidDateRange` error
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use rentiva_core::pricing::rental_days;
///
/// let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
/// assert_eq!(rental_days(start, end).unwrap(), 3);
/// ```
pub fn rental_days(start: NaiveDate, end: NaiveDate) -> CoreResult<i64> {
    if end < start {
        return Err(CoreError::InvalidDateRange { start, end });
    }

    // Inclusive on both ends, clamped so a same-day rental bills one day.
    Ok(((end - start).num_days() + 1).max(1))
}

/// Computes the total for one rental line:
/// `price_per_day × rental_days(start, end) × quantity`.
///
/// ## Arguments
/// * `price_per_day` - Non-negative daily rate
/// * `start`, `end` - Inclusive rental period, `end ≥ start`
/// * `quantity` - Number of units rented, must be positive
///
/// No side effects; the same precision (cents) in and out.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use rentiva_core::money::Money;
/// use rentiva_core::pricing::line_total;
///
/// let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
///
/// // $50.00/day × 3 days × 1 unit = $150.00
/// let total = line_total(Money::from_cents(5000), start, end, 1).unwrap();
/// assert_eq!(total.cents(), 15000);
/// ```
pub fn line_total(
    price_per_day: Money,
    start: NaiveDate,
    end: NaiveDate,
    quantity: i64,
) -> CoreResult<Money> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into());
    }
    if price_per_day.is_negative() {
        return Err(ValidationError::MustBePositive {
            field: "price_per_day".to_string(),
        }
        .into());
    }

    let days = rental_days(start, end)?;
    Ok(price_per_day.multiply_quantity(days).multiply_quantity(quantity))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_rental_days_inclusive() {
        assert_eq!(rental_days(date(2025, 6, 1), date(2025, 6, 3)).unwrap(), 3);
        assert_eq!(rental_days(date(2025, 6, 1), date(2025, 6, 30)).unwrap(), 30);
    }

    #[test]
    fn test_rental_days_same_day_is_one() {
        assert_eq!(rental_days(date(2025, 6, 1), date(2025, 6, 1)).unwrap(), 1);
    }

    #[test]
    fn test_rental_days_across_month_boundary() {
        assert_eq!(rental_days(date(2025, 6, 30), date(2025, 7, 2)).unwrap(), 3);
    }

    #[test]
    fn test_rental_days_rejects_inverted_range() {
        let err = rental_days(date(2025, 6, 3), date(2025, 6, 1)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_line_total_single_unit() {
        // $50.00/day, 2025-06-01..2025-06-03, qty 1 → 3 days → $150.00
        let total = line_total(
            Money::from_cents(5000),
            date(2025, 6, 1),
            date(2025, 6, 3),
            1,
        )
        .unwrap();
        assert_eq!(total.cents(), 15000);
    }

    #[test]
    fn test_line_total_multiple_units() {
        // $30.00/day, same 3-day range, qty 2 → $180.00
        let total = line_total(
            Money::from_cents(3000),
            date(2025, 6, 1),
            date(2025, 6, 3),
            2,
        )
        .unwrap();
        assert_eq!(total.cents(), 18000);
    }

    #[test]
    fn test_line_total_rejects_zero_quantity() {
        let err = line_total(
            Money::from_cents(5000),
            date(2025, 6, 1),
            date(2025, 6, 3),
            0,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_line_total_rejects_negative_price() {
        let err = line_total(
            Money::from_cents(-100),
            date(2025, 6, 1),
            date(2025, 6, 3),
            1,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_line_total_propagates_invalid_range() {
        let err = line_total(
            Money::from_cents(5000),
            date(2025, 6, 3),
            date(2025, 6, 1),
            1,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidDateRange { .. }));
    }
}
