//! Fixed-point math utilities for deterministic scoring.
//!
//! Every score, multiplier and bonus the engine produces uses fixed-point
//! arithmetic so that the same selections always yield bit-identical
//! aggregates, on every platform and across serialization boundaries.
//! Catalog data is authored in integer points and percents and converted
//! here.

use fixed::types::I32F32;

/// Fixed-point number type for all engine math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// Lowest possible effectiveness score.
pub const SCORE_MIN: Fixed = Fixed::ZERO;

/// Highest possible effectiveness score.
pub const SCORE_MAX: Fixed = Fixed::const_from_int(100);

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

/// Serde support for maps whose values are fixed-point numbers.
pub mod fixed_map_serde {
    use std::collections::BTreeMap;

    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize each value as its raw bit representation.
    pub fn serialize<S>(map: &BTreeMap<String, Fixed>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let bits: BTreeMap<&String, i64> = map.iter().map(|(k, v)| (k, v.to_bits())).collect();
        bits.serialize(serializer)
    }

    /// Deserialize each value from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<String, Fixed>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = BTreeMap::<String, i64>::deserialize(deserializer)?;
        Ok(bits
            .into_iter()
            .map(|(k, v)| (k, Fixed::from_bits(v)))
            .collect())
    }
}

/// Convert a whole number of points to fixed-point.
#[must_use]
pub fn points(value: i32) -> Fixed {
    Fixed::from_num(value)
}

/// Convert a percentage (e.g. `120` for 120%) to a fixed-point factor (`1.2`).
#[must_use]
pub fn percent(value: i32) -> Fixed {
    Fixed::from_num(value) / Fixed::from_num(100)
}

/// Clamp a value into the `[0, 100]` score range.
#[must_use]
pub fn clamp_score(value: Fixed) -> Fixed {
    value.clamp(SCORE_MIN, SCORE_MAX)
}

/// Arithmetic mean of a set of integer scores, or zero when empty.
#[must_use]
pub fn mean<I>(values: I) -> Fixed
where
    I: IntoIterator<Item = u32>,
{
    let mut sum: i64 = 0;
    let mut count: i64 = 0;
    for value in values {
        sum += i64::from(value);
        count += 1;
    }

    if count == 0 {
        return Fixed::ZERO;
    }

    Fixed::from_num(sum) / Fixed::from_num(count)
}

/// Round a fixed-point value to two decimal places for display.
#[must_use]
pub fn to_display(value: Fixed) -> f64 {
    (value.to_num::<f64>() * 100.0).round() / 100.0
}
