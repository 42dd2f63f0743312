//! Value representations for generated datasets.
//!
//! This module defines the values produced by the generation engine and the
//! transient containers (`Row`, `Batch`) that carry them to an output sink.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A single generated field value.
///
/// `FieldValue` is type-agnostic: the declared `FieldType` of the field it
/// belongs to decides which variant the engine produces. Serialization is
/// untagged so that every variant maps onto its natural JSON form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Null sentinel for nullable fields
    Null,

    /// Boolean value
    Bool(bool),

    /// Any integer type, widened to 64 bits
    Int(i64),

    /// Any float type, widened to 64 bits
    Float(f64),

    /// String value
    String(String),

    /// JSON document
    Json(serde_json::Value),

    /// Array of scalar values
    Array(Vec<FieldValue>),

    /// Dense float vector
    FloatVector(Vec<f32>),

    /// Half-precision vector as little-endian bytes, two per component
    Float16Vector(Vec<u8>),

    /// Bfloat16 vector as little-endian bytes, two per component
    BFloat16Vector(Vec<u8>),

    /// Bit-packed binary vector
    BinaryVector(Vec<u8>),

    /// Sparse float vector keyed by dimension index
    SparseFloatVector(BTreeMap<u32, f32>),
}

impl FieldValue {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as an array.
    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match self {
            Self::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to get this value as a dense float vector.
    pub fn as_float_vector(&self) -> Option<&[f32]> {
        match self {
            Self::FloatVector(v) => Some(v),
            _ => None,
        }
    }

    /// Raw byte payload of a binary or 16-bit float vector.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::BinaryVector(b) | Self::Float16Vector(b) | Self::BFloat16Vector(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get this value as a JSON document.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }
}

/// One generated record.
///
/// Fields are kept in schema declaration order. Names are shared with the
/// run's plans, so building a row does not allocate a string per field name.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Absolute row index within the run
    pub index: u64,

    /// Partition assigned from the partition-key value, if the schema has one
    pub partition: Option<u32>,

    /// Field values in schema order
    pub fields: Vec<(Arc<str>, FieldValue)>,
}

impl Row {
    /// Create a new row with room for `field_count` values.
    pub fn with_capacity(index: u64, field_count: usize) -> Self {
        Self {
            index,
            partition: None,
            fields: Vec::with_capacity(field_count),
        }
    }

    /// Append a field value.
    pub fn push(&mut self, name: Arc<str>, value: FieldValue) {
        self.fields.push((name, value));
    }

    /// Get a field value by name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field.as_ref() == name)
            .map(|(_, value)| value)
    }

    /// Get the number of fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

impl Serialize for Row {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name.as_ref(), value)?;
        }
        map.end()
    }
}

/// A bounded run of consecutive rows handed to a sink in one call.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Sequence number of this batch within its run (or worker)
    pub number: u64,

    /// Row index of the first row in the batch
    pub first_row: u64,

    /// The rows themselves
    pub rows: Vec<Row>,
}

impl Batch {
    /// Create an empty batch with room for `capacity` rows.
    pub fn with_capacity(number: u64, first_row: u64, capacity: usize) -> Self {
        Self {
            number,
            first_row,
            rows: Vec::with_capacity(capacity),
        }
    }

    /// Number of rows in the batch.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the batch holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
