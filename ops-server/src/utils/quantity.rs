//! Quantity arithmetic
//!
//! Quantities are stored as `REAL`; every add/subtract/compare goes through
//! `Decimal` so that `0.1 + 0.2` style drift never leaks into stock balances.

use rust_decimal::prelude::*;

/// Stored precision for quantities (grams / litres / pieces with fractions)
pub const QUANTITY_DECIMAL_PLACES: u32 = 3;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value)
        .unwrap_or_default()
        .round_dp_with_strategy(QUANTITY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert Decimal back to f64 for storage, rounded to 3 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(QUANTITY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

pub fn add(a: f64, b: f64) -> f64 {
    to_f64(to_decimal(a) + to_decimal(b))
}

pub fn sub(a: f64, b: f64) -> f64 {
    to_f64(to_decimal(a) - to_decimal(b))
}

/// `max(a - b, 0)`
pub fn sub_clamped(a: f64, b: f64) -> f64 {
    to_f64((to_decimal(a) - to_decimal(b)).max(Decimal::ZERO))
}

/// `a >= b` at stored precision
pub fn gte(a: f64, b: f64) -> bool {
    to_decimal(a) >= to_decimal(b)
}

/// `a > 0` at stored precision
pub fn is_positive(a: f64) -> bool {
    to_decimal(a) > Decimal::ZERO
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_float_drift() {
        assert_eq!(add(0.1, 0.2), 0.3);
        assert_eq!(sub(1.0, 0.9), 0.1);
    }

    #[test]
    fn test_sub_clamped() {
        assert_eq!(sub_clamped(5.0, 2.5), 2.5);
        assert_eq!(sub_clamped(2.0, 3.0), 0.0);
    }

    #[test]
    fn test_comparisons() {
        assert!(gte(0.3, 0.1 + 0.2));
        assert!(!gte(0.299, 0.3));
        assert!(is_positive(0.001));
        assert!(!is_positive(0.0004));
    }
}
