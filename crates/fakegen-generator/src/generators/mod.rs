//! Individual value generators for the supported field types.
//!
//! Each submodule provides free functions producing one [`FieldValue`] from
//! an explicitly passed random source. [`ValueSpec`] ties them together: it
//! is the compiled, type-directed description of how one field's values are
//! drawn when no enum, pool or uniqueness strategy applies.

pub mod array;
pub mod json;
pub mod numeric;
pub mod string;
pub mod vector;

use crate::config::{JsonShape, RunConfig};
use crate::error::GenerationError;
use fakegen_core::schema::DEFAULT_SPARSE_DIM;
use fakegen_core::{FieldDefinition, FieldType, FieldValue};
use rand::Rng;

/// Trait for generating values.
pub trait ValueGenerator {
    /// Generate a value using the given random source.
    fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> FieldValue;
}

/// Direct bounded-random generation for one field type.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSpec {
    /// Fair coin
    Bool,
    /// Uniform integer over `[min, max]`
    Int { min: i64, max: i64 },
    /// Uniform float over `[min, max]`, optionally rounded
    Float {
        min: f64,
        max: f64,
        precision: Option<u32>,
    },
    /// Alphanumeric string of length `[1, max_length]`
    VarChar { max_length: usize },
    /// Array of `[0, max_capacity]` elements
    Array {
        element: Box<ValueSpec>,
        max_capacity: usize,
    },
    /// Synthetic JSON object
    Json(JsonShape),
    /// Dense f32 vector
    FloatVector { dim: usize, normalize: bool },
    /// Dense 16-bit float vector, stored as little-endian bytes
    HalfVector {
        dim: usize,
        normalize: bool,
        format: vector::HalfFormat,
    },
    /// Bit-packed binary vector of `dim` bits
    BinaryVector { dim: usize },
    /// Sparse vector over the index space `[0, dim)`
    SparseFloatVector { dim: u32 },
}

impl ValueSpec {
    /// Compile the direct generator for a field.
    pub fn from_field(field: &FieldDefinition, config: &RunConfig) -> Result<Self, GenerationError> {
        let missing = |what: &str| {
            GenerationError::field_config(&field.name, format!("{} requires {what}", field.field_type))
        };

        let spec = match field.field_type {
            FieldType::Array => {
                let element_type = field.element_type.ok_or_else(|| missing("element_type"))?;
                let max_capacity = field.max_capacity.ok_or_else(|| missing("max_capacity"))?;
                let element = Self::scalar(field, element_type, config)?;
                Self::Array {
                    element: Box::new(element),
                    max_capacity: max_capacity as usize,
                }
            }
            FieldType::Json => Self::Json(config.json_shape.clone()),
            FieldType::FloatVector => Self::FloatVector {
                dim: positive_dim(field)?,
                normalize: field.normalize,
            },
            FieldType::Float16Vector => Self::HalfVector {
                dim: positive_dim(field)?,
                normalize: field.normalize,
                format: vector::HalfFormat::Float16,
            },
            FieldType::BFloat16Vector => Self::HalfVector {
                dim: positive_dim(field)?,
                normalize: field.normalize,
                format: vector::HalfFormat::BFloat16,
            },
            FieldType::BinaryVector => {
                let dim = positive_dim(field)?;
                if dim % 8 != 0 {
                    return Err(GenerationError::field_config(
                        &field.name,
                        format!("BinaryVector dim must be a multiple of 8, got {dim}"),
                    ));
                }
                Self::BinaryVector { dim }
            }
            FieldType::SparseFloatVector => {
                let dim = field.dim.unwrap_or(DEFAULT_SPARSE_DIM);
                if dim == 0 {
                    return Err(GenerationError::field_config(
                        &field.name,
                        "dim must be a positive integer",
                    ));
                }
                Self::SparseFloatVector { dim }
            }
            scalar => Self::scalar(field, scalar, config)?,
        };
        Ok(spec)
    }

    /// Compile a scalar generator using the field's bounds and lengths.
    fn scalar(
        field: &FieldDefinition,
        scalar: FieldType,
        config: &RunConfig,
    ) -> Result<Self, GenerationError> {
        let invalid = |reason: String| GenerationError::field_config(&field.name, reason);

        match scalar {
            FieldType::Bool => Ok(Self::Bool),
            FieldType::Int8 | FieldType::Int16 | FieldType::Int32 | FieldType::Int64 => {
                let (min, max) = field
                    .integer_range()
                    .ok_or_else(|| invalid(format!("no integer range for {scalar}")))?;
                if min > max {
                    return Err(invalid(format!("min ({min}) exceeds max ({max})")));
                }
                Ok(Self::Int { min, max })
            }
            FieldType::Float | FieldType::Double => {
                let (min, max) = field
                    .float_range()
                    .ok_or_else(|| invalid(format!("no float range for {scalar}")))?;
                if !(min <= max && (max - min).is_finite()) {
                    return Err(invalid(format!("invalid float range [{min}, {max}]")));
                }
                Ok(Self::Float {
                    min,
                    max,
                    precision: field.precision.or(config.float_precision),
                })
            }
            FieldType::VarChar => match field.max_length {
                Some(max_length) if max_length > 0 => Ok(Self::VarChar {
                    max_length: max_length as usize,
                }),
                _ => Err(invalid("VarChar requires a positive max_length".to_string())),
            },
            other => Err(invalid(format!("{other} is not a scalar type"))),
        }
    }

    /// Number of distinct values this spec can produce, when it is small
    /// enough to matter. `None` means "effectively unbounded".
    pub fn domain_size(&self) -> Option<u128> {
        match self {
            Self::Bool => Some(2),
            Self::Int { min, max } => Some((i128::from(*max) - i128::from(*min) + 1) as u128),
            Self::Float {
                min,
                max,
                precision: Some(p),
            } => {
                let steps = ((max - min) * 10f64.powi(*p as i32)).floor();
                (steps < 1e30).then(|| steps as u128 + 1)
            }
            Self::VarChar { max_length } => {
                let alphabet = string::ALPHABET_SIZE as u128;
                let mut total: u128 = 0;
                let mut per_length: u128 = 1;
                for _ in 0..*max_length {
                    per_length = per_length.saturating_mul(alphabet);
                    total = total.saturating_add(per_length);
                    if total == u128::MAX {
                        return None;
                    }
                }
                Some(total)
            }
            _ => None,
        }
    }
}

fn positive_dim(field: &FieldDefinition) -> Result<usize, GenerationError> {
    match field.dim {
        Some(dim) if dim > 0 => Ok(dim as usize),
        _ => Err(GenerationError::field_config(
            &field.name,
            format!("{} requires a positive dim", field.field_type),
        )),
    }
}

impl ValueGenerator for ValueSpec {
    fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> FieldValue {
        match self {
            Self::Bool => numeric::generate_bool(rng),
            Self::Int { min, max } => numeric::generate_int_range(rng, *min, *max),
            Self::Float {
                min,
                max,
                precision,
            } => numeric::generate_float_range(rng, *min, *max, *precision),
            Self::VarChar { max_length } => string::generate_varchar(rng, *max_length),
            Self::Array {
                element,
                max_capacity,
            } => array::generate_array(rng, element, *max_capacity),
            Self::Json(shape) => json::generate_json(rng, shape),
            Self::FloatVector { dim, normalize } => {
                vector::generate_float_vector(rng, *dim, *normalize)
            }
            Self::HalfVector {
                dim,
                normalize,
                format,
            } => vector::generate_half_vector(rng, *dim, *normalize, *format),
            Self::BinaryVector { dim } => vector::generate_binary_vector(rng, *dim),
            Self::SparseFloatVector { dim } => vector::generate_sparse_vector(rng, *dim),
        }
    }
}
