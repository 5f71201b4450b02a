/// FileHub Engine — Arithmetic Primitives
///
/// Currency is i64. Percentages and scores are f64, clamped (never wrapped)
/// to their declared range after every mutation.

use crate::error::{EngineError, EngineResult};

pub const PERCENT_MIN: f64 = 0.0;
pub const PERCENT_MAX: f64 = 100.0;
pub const NPS_MIN: f64 = -100.0;
pub const NPS_MAX: f64 = 100.0;

/// Clamp to [0, 100].
pub fn clamp_percent(value: f64) -> f64 {
    value.clamp(PERCENT_MIN, PERCENT_MAX)
}

/// Clamp to [-100, 100].
pub fn clamp_nps(value: f64) -> f64 {
    value.clamp(NPS_MIN, NPS_MAX)
}

/// Checked currency addition.
pub fn checked_add(a: i64, b: i64) -> EngineResult<i64> {
    a.checked_add(b)
        .ok_or_else(|| EngineError::Overflow(format!("{} + {} overflows i64", a, b)))
}

/// Checked currency subtraction.
pub fn checked_sub(a: i64, b: i64) -> EngineResult<i64> {
    a.checked_sub(b)
        .ok_or_else(|| EngineError::Overflow(format!("{} - {} overflows i64", a, b)))
}

/// Checked currency multiplication.
pub fn checked_mul(a: i64, b: i64) -> EngineResult<i64> {
    a.checked_mul(b)
        .ok_or_else(|| EngineError::Overflow(format!("{} * {} overflows i64", a, b)))
}

/// Floor a real value into currency. Rejects NaN, infinities and values
/// outside the i64 range instead of saturating.
pub fn floor_to_i64(value: f64) -> EngineResult<i64> {
    let floored = value.floor();
    if !floored.is_finite() || floored < i64::MIN as f64 || floored >= i64::MAX as f64 {
        return Err(EngineError::Overflow(format!(
            "{} does not fit in i64",
            value
        )));
    }
    Ok(floored as i64)
}
