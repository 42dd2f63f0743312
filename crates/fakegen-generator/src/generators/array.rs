//! Array value generator.

use super::{ValueGenerator, ValueSpec};
use fakegen_core::FieldValue;
use rand::Rng;

/// Generate an array whose length is uniform over `[0, max_capacity]`,
/// drawing every element independently from `element`.
pub fn generate_array<R: Rng + ?Sized>(
    rng: &mut R,
    element: &ValueSpec,
    max_capacity: usize,
) -> FieldValue {
    let length = rng.random_range(0..=max_capacity);
    let items: Vec<FieldValue> = (0..length).map(|_| element.generate(rng)).collect();
    FieldValue::Array(items)
}
