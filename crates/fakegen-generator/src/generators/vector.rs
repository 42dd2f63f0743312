//! Vector value generators.

use fakegen_core::FieldValue;
use half::{bf16, f16};
use rand::seq::index;
use rand::Rng;
use std::collections::BTreeMap;

/// Most non-zero entries a generated sparse vector carries.
pub const SPARSE_MAX_NNZ: u32 = 16;

/// Generate `dim` components uniform over `[-1, 1]`, rescaled to unit L2
/// norm when `normalize` is set.
pub fn generate_float_vector<R: Rng + ?Sized>(
    rng: &mut R,
    dim: usize,
    normalize: bool,
) -> FieldValue {
    FieldValue::FloatVector(dense_components(rng, dim, normalize))
}

/// Storage format of a 16-bit float vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalfFormat {
    /// IEEE 754 binary16
    Float16,
    /// bfloat16: f32 exponent with a 7-bit mantissa
    BFloat16,
}

/// Generate a 16-bit float vector of `dim` components in `[-1, 1]`,
/// encoded as `2 * dim` little-endian bytes.
pub fn generate_half_vector<R: Rng + ?Sized>(
    rng: &mut R,
    dim: usize,
    normalize: bool,
    format: HalfFormat,
) -> FieldValue {
    let components = dense_components(rng, dim, normalize);
    let mut bytes = Vec::with_capacity(dim * 2);
    for c in components {
        let encoded = match format {
            HalfFormat::Float16 => f16::from_f32(c).to_le_bytes(),
            HalfFormat::BFloat16 => bf16::from_f32(c).to_le_bytes(),
        };
        bytes.extend_from_slice(&encoded);
    }

    match format {
        HalfFormat::Float16 => FieldValue::Float16Vector(bytes),
        HalfFormat::BFloat16 => FieldValue::BFloat16Vector(bytes),
    }
}

fn dense_components<R: Rng + ?Sized>(rng: &mut R, dim: usize, normalize: bool) -> Vec<f32> {
    let mut components: Vec<f32> = (0..dim).map(|_| rng.random_range(-1.0f32..=1.0)).collect();

    if normalize {
        let norm = components
            .iter()
            .map(|c| f64::from(*c) * f64::from(*c))
            .sum::<f64>()
            .sqrt();
        if norm > 0.0 {
            for c in &mut components {
                *c = (f64::from(*c) / norm) as f32;
            }
        }
    }

    components
}

/// Generate a binary vector of `dim` bits packed into `dim / 8` bytes.
pub fn generate_binary_vector<R: Rng + ?Sized>(rng: &mut R, dim: usize) -> FieldValue {
    let mut bytes = vec![0u8; dim / 8];
    rng.fill_bytes(&mut bytes);
    FieldValue::BinaryVector(bytes)
}

/// Generate a sparse vector with between 1 and `min(dim, 16)` distinct
/// indices in `[0, dim)`, each holding a value in `(0, 1]`.
pub fn generate_sparse_vector<R: Rng + ?Sized>(rng: &mut R, dim: u32) -> FieldValue {
    let max_nnz = dim.clamp(1, SPARSE_MAX_NNZ) as usize;
    let nnz = rng.random_range(1..=max_nnz);

    let mut entries = BTreeMap::new();
    for idx in index::sample(rng, dim as usize, nnz) {
        let value = 1.0 - rng.random::<f32>();
        entries.insert(idx as u32, value);
    }

    FieldValue::SparseFloatVector(entries)
}
