//! Collection schema definitions.
//!
//! A schema describes one collection: its ordered fields, their types and
//! the constraints generated data must satisfy. Schemas are loaded from YAML
//! (or JSON, which YAML accepts) and validated before any generation starts.
//! Validation never stops at the first problem: every violation found is
//! reported so a schema can be fixed in one pass.

use crate::types::FieldType;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

/// Maximum decimal places a float field may request.
pub const MAX_FLOAT_PRECISION: u32 = 15;

/// Index space of a sparse vector when `dim` is omitted.
pub const DEFAULT_SPARSE_DIM: u32 = 1000;

/// Default inclusive range of `Float`/`Double` fields without bounds.
pub const DEFAULT_FLOAT_RANGE: (f64, f64) = (0.0, 1.0);

// ============================================================================
// Error Types
// ============================================================================

/// Error type for schema operations.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Error reading schema file
    #[error("Failed to read schema file: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing YAML/JSON
    #[error("Failed to parse schema: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The schema parsed but violates one or more rules
    #[error("Invalid schema:\n{0}")]
    Invalid(Violations),
}

impl SchemaError {
    /// Violations carried by an `Invalid` error.
    pub fn violations(&self) -> &[String] {
        match self {
            Self::Invalid(v) => &v.0,
            _ => &[],
        }
    }
}

/// Every rule a schema broke, in the order they were found.
#[derive(Debug, Clone, PartialEq)]
pub struct Violations(pub Vec<String>);

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {violation}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Constraint Values
// ============================================================================

/// A numeric bound as written in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    /// Integer literal
    Int(i64),
    /// Floating point literal
    Float(f64),
}

impl Number {
    /// Value as f64.
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Int(i) => *i as f64,
            Self::Float(f) => *f,
        }
    }

    /// Value as i64 when written as an integer literal.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(_) => None,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
        }
    }
}

/// One member of a closed enum domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    /// Integer member (integer fields)
    Int(i64),
    /// String member (`VarChar` fields)
    Str(String),
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

// ============================================================================
// Field & Schema Definitions
// ============================================================================

/// Definition of one collection field with its generation constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDefinition {
    /// Field name
    pub name: String,

    /// Declared type
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Free-text description (carried through to manifests)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether this field is the primary key
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_primary: bool,

    /// Primary key values come from a monotonic sequence
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto_id: bool,

    /// Whether this field decides the row's partition
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_partition_key: bool,

    /// Whether this field may be null
    #[serde(default, skip_serializing_if = "is_false")]
    pub nullable: bool,

    /// Per-field null probability, overriding the run default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_probability: Option<f64>,

    /// Minimum value (inclusive), numeric fields and numeric arrays
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Number>,

    /// Maximum value (inclusive), numeric fields and numeric arrays
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Number>,

    /// Maximum string length, `VarChar` fields and `VarChar` arrays
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,

    /// Element type of an `Array` field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<FieldType>,

    /// Maximum number of elements of an `Array` field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<u32>,

    /// Vector dimension
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dim: Option<u32>,

    /// Decimal places kept on generated floats
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,

    /// Rescale float vectors to unit L2 norm
    #[serde(default, skip_serializing_if = "is_false")]
    pub normalize: bool,

    /// Target fraction of distinct values relative to the row count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardinality_ratio: Option<f64>,

    /// Closed domain of allowed values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<EnumValue>>,

    /// Relative weights for `enum_values`, same length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_weights: Option<Vec<f64>>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl FieldDefinition {
    /// Create a plain field of the given type with no constraints.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            description: None,
            is_primary: false,
            auto_id: false,
            is_partition_key: false,
            nullable: false,
            null_probability: None,
            min: None,
            max: None,
            max_length: None,
            element_type: None,
            max_capacity: None,
            dim: None,
            precision: None,
            normalize: false,
            cardinality_ratio: None,
            enum_values: None,
            enum_weights: None,
        }
    }

    /// Type that numeric bounds and string lengths apply to: the element
    /// type for arrays, the field type otherwise.
    pub fn value_type(&self) -> Option<FieldType> {
        match self.field_type {
            FieldType::Array => self.element_type,
            other => Some(other),
        }
    }

    /// Effective inclusive integer range, falling back to the type's
    /// default when a bound is omitted.
    pub fn integer_range(&self) -> Option<(i64, i64)> {
        let value_type = self.value_type()?;
        let (type_min, type_max) = value_type.integer_bounds()?;
        let default_min = if value_type == FieldType::Int64 {
            0
        } else {
            type_min
        };
        let min = self.min.and_then(|n| n.as_i64()).unwrap_or(default_min);
        let max = self.max.and_then(|n| n.as_i64()).unwrap_or(type_max);
        Some((min, max))
    }

    /// Effective inclusive float range.
    pub fn float_range(&self) -> Option<(f64, f64)> {
        let value_type = self.value_type()?;
        if !value_type.is_float() {
            return None;
        }
        let min = self.min.map(|n| n.as_f64()).unwrap_or(DEFAULT_FLOAT_RANGE.0);
        let max = self.max.map(|n| n.as_f64()).unwrap_or(DEFAULT_FLOAT_RANGE.1);
        Some((min, max))
    }

    /// Validate this field in isolation, appending violations.
    fn validate_into(&self, violations: &mut Vec<String>) {
        let name = &self.name;
        let ty = self.field_type;
        let mut push = |msg: String| violations.push(format!("field '{name}': {msg}"));

        if self.name.trim().is_empty() {
            push("field name must not be empty".to_string());
        }

        // Primary key
        if self.is_primary {
            if !matches!(ty, FieldType::Int64 | FieldType::VarChar) {
                push(format!("primary key must be Int64 or VarChar, got {ty}"));
            }
            if self.nullable {
                push("primary key cannot be nullable".to_string());
            }
            if self.cardinality_ratio.is_some() {
                push("primary key cannot declare cardinality_ratio".to_string());
            }
            if self.enum_values.is_some() {
                push("primary key cannot declare enum_values".to_string());
            }
        }
        if self.auto_id {
            if !self.is_primary {
                push("auto_id is only valid on the primary key".to_string());
            } else if ty != FieldType::Int64 {
                push(format!("auto_id requires an Int64 primary key, got {ty}"));
            }
        }

        // Partition key
        if self.is_partition_key {
            if !(ty.is_integer() || ty == FieldType::VarChar) {
                push(format!(
                    "partition key must be an integer or VarChar field, got {ty}"
                ));
            }
            if self.is_primary {
                push("partition key cannot be the primary key".to_string());
            }
            if self.nullable {
                push("partition key cannot be nullable".to_string());
            }
        }

        // Nullability
        if let Some(p) = self.null_probability {
            if !self.nullable {
                push("null_probability requires nullable: true".to_string());
            }
            if !(0.0..=1.0).contains(&p) {
                push(format!("null_probability must be in [0, 1], got {p}"));
            }
        }

        // Array shape
        if ty == FieldType::Array {
            match self.element_type {
                None => push("Array field requires element_type".to_string()),
                Some(element) if !element.is_scalar() => push(format!(
                    "Array element_type must be a scalar type, got {element}"
                )),
                Some(_) => {}
            }
            if self.max_capacity.is_none() {
                push("Array field requires max_capacity".to_string());
            }
        } else {
            if self.element_type.is_some() {
                push(format!("element_type is only valid on Array fields, not {ty}"));
            }
            if self.max_capacity.is_some() {
                push(format!("max_capacity is only valid on Array fields, not {ty}"));
            }
        }

        let value_type = self.value_type();

        // String length
        if value_type == Some(FieldType::VarChar) {
            match self.max_length {
                None => push("VarChar values require max_length".to_string()),
                Some(0) => push("max_length must be greater than 0".to_string()),
                Some(_) => {}
            }
        } else if self.max_length.is_some() {
            push(format!("max_length is only valid on VarChar values, not {ty}"));
        }

        // Numeric range
        let numeric = value_type.is_some_and(|t| t.is_numeric());
        if !numeric && (self.min.is_some() || self.max.is_some()) {
            push(format!("min/max are only valid on numeric values, not {ty}"));
        }
        if let Some(vt) = value_type.filter(|t| t.is_integer()) {
            let mut bounds_ok = true;
            if let Some((type_min, type_max)) = vt.integer_bounds() {
                for (label, bound) in [("min", self.min), ("max", self.max)] {
                    match bound {
                        Some(Number::Float(f)) => {
                            bounds_ok = false;
                            push(format!("{label} must be an integer for {vt}, got {f}"))
                        }
                        Some(Number::Int(i)) if i < type_min || i > type_max => {
                            bounds_ok = false;
                            push(format!("{label} {i} is out of range for {vt}"))
                        }
                        _ => {}
                    }
                }
            }
            // Omitted bounds take the type defaults, so compare the effective range.
            if let Some((min, max)) = self.integer_range().filter(|_| bounds_ok) {
                if min >= max {
                    push(format!("min ({min}) must be less than max ({max})"));
                }
            }
        }
        if let Some((min, max)) = self.float_range() {
            if !min.is_finite() || !max.is_finite() {
                push("min/max must be finite".to_string());
            } else if min >= max {
                push(format!("min ({min}) must be less than max ({max})"));
            } else if !(max - min).is_finite() {
                push(format!("range [{min}, {max}] is too wide to sample"));
            }
            if value_type == Some(FieldType::Float) {
                let f32_range = f64::from(f32::MIN)..=f64::from(f32::MAX);
                for (label, bound) in [("min", min), ("max", max)] {
                    if bound.is_finite() && !f32_range.contains(&bound) {
                        push(format!("{label} {bound} is out of range for Float"));
                    }
                }
            }
        }

        // Float options
        if let Some(precision) = self.precision {
            if !value_type.is_some_and(|t| t.is_float()) {
                push(format!("precision is only valid on Float/Double values, not {ty}"));
            } else if precision > MAX_FLOAT_PRECISION {
                push(format!(
                    "precision must be at most {MAX_FLOAT_PRECISION}, got {precision}"
                ));
            }
        }

        // Vectors
        match ty {
            FieldType::FloatVector
            | FieldType::Float16Vector
            | FieldType::BFloat16Vector
            | FieldType::BinaryVector => match self.dim {
                None => push(format!("{ty} field requires dim")),
                Some(0) => push("dim must be a positive integer".to_string()),
                Some(dim) if ty == FieldType::BinaryVector && dim % 8 != 0 => {
                    push(format!("BinaryVector dim must be a multiple of 8, got {dim}"))
                }
                Some(_) => {}
            },
            FieldType::SparseFloatVector => {
                if self.dim == Some(0) {
                    push("dim must be a positive integer".to_string());
                }
            }
            _ => {
                if self.dim.is_some() {
                    push(format!("dim is only valid on vector fields, not {ty}"));
                }
            }
        }
        if self.normalize && !ty.is_dense_float_vector() {
            push(format!("normalize is only valid on dense float vectors, not {ty}"));
        }

        // Cardinality
        if let Some(ratio) = self.cardinality_ratio {
            if !(ratio > 0.0 && ratio <= 1.0) {
                push(format!("cardinality_ratio must be in (0, 1], got {ratio}"));
            }
            if !(ty.is_numeric() || ty == FieldType::VarChar) {
                push(format!(
                    "cardinality_ratio is only valid on numeric or VarChar fields, not {ty}"
                ));
            }
            if self.enum_values.is_some() {
                push("cardinality_ratio and enum_values are mutually exclusive".to_string());
            }
        }

        // Enum domain
        if let Some(values) = &self.enum_values {
            if values.is_empty() {
                push("enum_values must not be empty".to_string());
            }
            if !(ty.is_integer() || ty == FieldType::VarChar) {
                push(format!(
                    "enum_values are only valid on integer or VarChar fields, not {ty}"
                ));
            } else {
                let range = self.integer_range();
                for value in values {
                    match (value, range) {
                        (EnumValue::Int(i), Some((min, max))) if *i < min || *i > max => {
                            push(format!("enum value {i} is outside [{min}, {max}]"))
                        }
                        (EnumValue::Int(_), Some(_)) => {}
                        (EnumValue::Str(s), None) => {
                            if let Some(max_len) = self.max_length {
                                if s.chars().count() > max_len as usize {
                                    push(format!(
                                        "enum value {value} exceeds max_length {max_len}"
                                    ));
                                }
                            }
                        }
                        _ => push(format!("enum value {value} does not match type {ty}")),
                    }
                }
            }
            let mut seen = HashSet::new();
            for value in values {
                if !seen.insert(value) {
                    push(format!("duplicate enum value {value}"));
                }
            }
            if let Some(weights) = &self.enum_weights {
                if weights.len() != values.len() {
                    push(format!(
                        "enum_weights has {} entries but enum_values has {}",
                        weights.len(),
                        values.len()
                    ));
                }
                if weights.iter().any(|w| !(w.is_finite() && *w > 0.0)) {
                    push("enum_weights must all be positive and finite".to_string());
                }
            }
        } else if self.enum_weights.is_some() {
            push("enum_weights requires enum_values".to_string());
        }
    }
}

/// Full collection schema.
///
/// The schema is the source of truth for data generation: it is parsed
/// once, validated, and then only read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDefinition {
    /// Collection name
    pub collection_name: String,

    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Field definitions in declaration order
    pub fields: Vec<FieldDefinition>,

    /// Number of logical partitions for the partition key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_partitions: Option<u32>,
}

impl SchemaDefinition {
    /// Load and validate a schema file (YAML or JSON).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let content = fs::read(path)?;
        Self::parse(&content)
    }

    /// Parse and validate a schema from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaError> {
        Self::parse(yaml.as_bytes())
    }

    /// Parse and validate raw schema bytes (YAML or JSON).
    pub fn parse(raw: &[u8]) -> Result<Self, SchemaError> {
        let schema: SchemaDefinition = serde_yaml::from_slice(raw)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Check every schema rule, reporting all violations at once.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::Invalid(Violations(violations)))
        }
    }

    /// List every rule this schema breaks.
    pub fn violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        if self.collection_name.trim().is_empty() {
            violations.push("collection_name must not be empty".to_string());
        }
        if self.fields.is_empty() {
            violations.push("schema must declare at least one field".to_string());
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for field in &self.fields {
            *counts.entry(field.name.as_str()).or_default() += 1;
        }
        let mut reported = HashSet::new();
        for field in &self.fields {
            if counts[field.name.as_str()] > 1 && reported.insert(field.name.as_str()) {
                violations.push(format!("duplicate field name '{}'", field.name));
            }
        }

        let primaries: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.is_primary)
            .map(|f| f.name.as_str())
            .collect();
        match primaries.len() {
            0 if !self.fields.is_empty() => {
                violations.push("schema must have exactly one primary key field, found none".to_string())
            }
            0 | 1 => {}
            _ => violations.push(format!(
                "schema must have exactly one primary key field, found {}: {}",
                primaries.len(),
                primaries.join(", ")
            )),
        }

        let partition_keys: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.is_partition_key)
            .map(|f| f.name.as_str())
            .collect();
        if partition_keys.len() > 1 {
            violations.push(format!(
                "schema may have at most one partition key field, found {}: {}",
                partition_keys.len(),
                partition_keys.join(", ")
            ));
        }

        if let Some(n) = self.num_partitions {
            if n == 0 {
                violations.push("num_partitions must be greater than 0".to_string());
            }
            if partition_keys.is_empty() {
                violations.push("num_partitions requires a partition key field".to_string());
            }
        }

        for field in &self.fields {
            field.validate_into(&mut violations);
        }

        violations
    }

    /// Get a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The primary key field.
    pub fn primary_field(&self) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.is_primary)
    }

    /// The partition key field, if any.
    pub fn partition_key_field(&self) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.is_partition_key)
    }

    /// All field names in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}
