//! Lenient numeric fields.
//!
//! Browser clocks are computed with floating point, so clients send values
//! like `299876.5`, and a flag fall can produce a negative remainder. The
//! helpers here accept any JSON number and round it into the target range
//! instead of rejecting the whole frame.

use serde::{Deserialize, Deserializer};

/// Rounds to the nearest integer, clamping to `0..=u64::MAX`.
pub(crate) fn saturating_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    // Float-to-int `as` casts saturate: negatives become 0.
    Ok(value.round() as u64)
}

/// Rounds to the nearest integer, clamping to `0..=u32::MAX`.
pub(crate) fn saturating_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(value.round() as u32)
}
