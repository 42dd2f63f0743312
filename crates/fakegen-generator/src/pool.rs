//! Cardinality pools.
//!
//! A field with a `cardinality_ratio` draws its values from a pool of
//! `max(1, round(ratio × rows))` distinct values built before streaming
//! starts. Rows then draw uniformly with replacement, so the number of
//! distinct values in the output converges to the pool size as the row count
//! grows.

use crate::error::GenerationError;
use crate::generators::{ValueGenerator, ValueSpec};
use crate::unique::KeyRepr;
use fakegen_core::FieldValue;
use rand::seq::index;
use rand::Rng;
use std::collections::HashSet;

/// Pre-materialized distinct values for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct CardinalityPool {
    values: Vec<FieldValue>,
}

impl CardinalityPool {
    /// Pool size for a ratio over a row count.
    pub fn pool_size(ratio: f64, total_rows: u64) -> usize {
        ((ratio * total_rows as f64).round() as usize).max(1)
    }

    /// Build a pool of `size` distinct values from `spec`.
    ///
    /// Fails with `InvalidConfiguration` when the spec cannot produce that
    /// many distinct values, and with `ExhaustedKeyspace` when a slot cannot
    /// be filled within `max_attempts` draws.
    pub fn build<R: Rng + ?Sized>(
        field: &str,
        spec: &ValueSpec,
        size: usize,
        rng: &mut R,
        max_attempts: u32,
    ) -> Result<Self, GenerationError> {
        if let Some(domain) = spec.domain_size() {
            if domain < size as u128 {
                return Err(GenerationError::field_config(
                    field,
                    format!("cardinality pool needs {size} distinct values but the field can only produce {domain}"),
                ));
            }
            // Dense integer pools: sample without replacement instead of
            // rejection sampling, which would stall near the domain size.
            if let ValueSpec::Int { min, .. } = spec {
                if domain <= (size as u128).saturating_mul(4) {
                    let values = index::sample(rng, domain as usize, size)
                        .into_iter()
                        .map(|offset| FieldValue::Int(min.wrapping_add(offset as i64)))
                        .collect();
                    return Ok(Self { values });
                }
            }
        }

        let mut seen = HashSet::with_capacity(size);
        let mut values = Vec::with_capacity(size);
        while values.len() < size {
            let mut attempts = 0;
            loop {
                attempts += 1;
                let candidate = spec.generate(rng);
                let fresh = match KeyRepr::of(&candidate) {
                    Some(key) => seen.insert(key),
                    None => true,
                };
                if fresh {
                    values.push(candidate);
                    break;
                }
                if attempts >= max_attempts {
                    return Err(GenerationError::ExhaustedKeyspace {
                        field: field.to_string(),
                        attempts,
                        row_index: None,
                    });
                }
            }
        }

        Ok(Self { values })
    }

    /// Draw one value uniformly with replacement.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> FieldValue {
        let idx = rng.random_range(0..self.values.len());
        self.values[idx].clone()
    }

    /// Number of distinct values in the pool.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the pool is empty (never true for a built pool).
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The pooled values.
    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }
}
