//! Numeric and boolean value generators.

use fakegen_core::FieldValue;
use rand::Rng;

/// Generate a fair random boolean.
pub fn generate_bool<R: Rng + ?Sized>(rng: &mut R) -> FieldValue {
    FieldValue::Bool(rng.random_bool(0.5))
}

/// Generate a random integer in the given range (inclusive).
pub fn generate_int_range<R: Rng + ?Sized>(rng: &mut R, min: i64, max: i64) -> FieldValue {
    FieldValue::Int(rng.random_range(min..=max))
}

/// Generate a random float in the given range (inclusive).
///
/// With a precision the value is rounded to that many decimal places and
/// then clamped, so rounding never leaves `[min, max]`.
pub fn generate_float_range<R: Rng + ?Sized>(
    rng: &mut R,
    min: f64,
    max: f64,
    precision: Option<u32>,
) -> FieldValue {
    let value = if min < max {
        rng.random_range(min..=max)
    } else {
        min
    };
    let value = match precision {
        Some(places) => round_to_places(value, places).clamp(min, max),
        None => value,
    };
    FieldValue::Float(value)
}

/// Round to a fixed number of decimal places.
pub fn round_to_places(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
