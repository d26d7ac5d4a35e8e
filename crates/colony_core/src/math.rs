//! Fixed-point math utilities for deterministic production.
//!
//! Modifier values (percentages, multipliers) are fractional, but goods
//! amounts are whole numbers. All fractional work happens in fixed-point
//! so the same colony produces the same numbers on every platform.

use fixed::types::{I32F32, I64F64};

/// Fixed-point number type for all modifier math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Convert a fixed-point value to a goods amount, rounding toward negative
/// infinity.
///
/// Saturates at the `i32` range.
#[must_use]
pub fn floor_to_amount(value: Fixed) -> i32 {
    value.floor().saturating_to_num::<i32>()
}

/// Fixed-point value of a whole goods amount.
#[must_use]
pub fn from_amount(amount: i32) -> Fixed {
    Fixed::from_num(amount)
}

/// `percent` percent of `value`.
///
/// The product is formed at double width, so only a result outside the
/// `Fixed` range can be lost; such results saturate.
#[must_use]
pub fn percent_of(value: Fixed, percent: Fixed) -> Fixed {
    let wide = I64F64::from_num(value) * I64F64::from_num(percent) / I64F64::from_num(100);
    Fixed::saturating_from_num(wide)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_to_amount() {
        assert_eq!(floor_to_amount(Fixed::from_num(7.9)), 7);
        assert_eq!(floor_to_amount(Fixed::from_num(-0.5)), -1);
        assert_eq!(floor_to_amount(from_amount(12)), 12);
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(from_amount(6), from_amount(50)), from_amount(3));
        assert_eq!(percent_of(from_amount(8), from_amount(-25)), from_amount(-2));
        assert_eq!(percent_of(from_amount(3), from_amount(50)), Fixed::from_num(1.5));
    }

    #[test]
    fn test_percent_of_large_values() {
        assert_eq!(
            percent_of(from_amount(30_000_000), from_amount(100)),
            from_amount(30_000_000)
        );
        assert_eq!(percent_of(Fixed::MAX, from_amount(1_000)), Fixed::MAX);
    }
}
