//! Field types for vector-database collection schemas.
//!
//! This module defines `FieldType`, the closed set of column types a
//! collection schema may declare, together with the category helpers the
//! validator and the generator use to decide which constraints apply.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Declared type of a collection field.
///
/// # YAML Format
///
/// Types are written as plain strings. Matching is case-insensitive and
/// accepts both the canonical names and snake_case aliases:
/// ```yaml
/// type: Int64
/// type: VarChar      # also "String", "var_char", "varchar"
/// type: FloatVector  # also "float_vector"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Boolean value
    Bool,

    /// 8-bit signed integer
    Int8,

    /// 16-bit signed integer
    Int16,

    /// 32-bit signed integer
    Int32,

    /// 64-bit signed integer
    Int64,

    /// 32-bit IEEE 754 floating point
    Float,

    /// 64-bit IEEE 754 floating point
    Double,

    /// Variable-length string bounded by `max_length`
    VarChar,

    /// Free-form JSON document
    Json,

    /// Array of scalar elements bounded by `max_capacity`
    Array,

    /// Dense vector of `dim` f32 components
    FloatVector,

    /// Dense vector of `dim` IEEE 754 half-precision components
    Float16Vector,

    /// Dense vector of `dim` bfloat16 components
    BFloat16Vector,

    /// Bit-packed binary vector of `dim` bits
    BinaryVector,

    /// Sparse vector of (index, f32) pairs
    SparseFloatVector,
}

impl FieldType {
    /// Canonical name used when serializing.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::Int8 => "Int8",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::VarChar => "VarChar",
            Self::Json => "JSON",
            Self::Array => "Array",
            Self::FloatVector => "FloatVector",
            Self::Float16Vector => "Float16Vector",
            Self::BFloat16Vector => "BFloat16Vector",
            Self::BinaryVector => "BinaryVector",
            Self::SparseFloatVector => "SparseFloatVector",
        }
    }

    /// Parse a type name, accepting case-insensitive names and aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "bool" | "boolean" => Some(Self::Bool),
            "int8" | "tinyint" => Some(Self::Int8),
            "int16" | "smallint" => Some(Self::Int16),
            "int32" | "int" => Some(Self::Int32),
            "int64" | "bigint" => Some(Self::Int64),
            "float" | "float32" => Some(Self::Float),
            "double" | "float64" => Some(Self::Double),
            "varchar" | "string" => Some(Self::VarChar),
            "json" => Some(Self::Json),
            "array" => Some(Self::Array),
            "floatvector" => Some(Self::FloatVector),
            "float16vector" | "fp16vector" => Some(Self::Float16Vector),
            "bfloat16vector" | "bf16vector" => Some(Self::BFloat16Vector),
            "binaryvector" => Some(Self::BinaryVector),
            "sparsefloatvector" | "sparsevector" => Some(Self::SparseFloatVector),
            _ => None,
        }
    }

    /// Inclusive value range of an integer type.
    pub fn integer_bounds(&self) -> Option<(i64, i64)> {
        match self {
            Self::Int8 => Some((i8::MIN as i64, i8::MAX as i64)),
            Self::Int16 => Some((i16::MIN as i64, i16::MAX as i64)),
            Self::Int32 => Some((i32::MIN as i64, i32::MAX as i64)),
            Self::Int64 => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }

    /// Check if this type is one of the integer types.
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    /// Check if this type is a floating point type.
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    /// Check if this type is numeric (integer or float).
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Check if this type is a vector type.
    pub fn is_vector(&self) -> bool {
        self.is_dense_float_vector() || matches!(self, Self::BinaryVector | Self::SparseFloatVector)
    }

    /// Check if this type is a dense vector of floating point components.
    pub fn is_dense_float_vector(&self) -> bool {
        matches!(
            self,
            Self::FloatVector | Self::Float16Vector | Self::BFloat16Vector
        )
    }

    /// Check if this type may be used as an array element.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Bool | Self::VarChar) || self.is_numeric()
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{Error, Visitor};

        struct FieldTypeVisitor;

        impl Visitor<'_> for FieldTypeVisitor {
            type Value = FieldType;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a field type name such as \"Int64\" or \"FloatVector\"")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: Error,
            {
                FieldType::from_name(value)
                    .ok_or_else(|| E::custom(format!("unknown field type: {value}")))
            }
        }

        deserializer.deserialize_str(FieldTypeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_aliases() {
        let cases = [
            ("Int64", FieldType::Int64),
            ("int64", FieldType::Int64),
            ("VarChar", FieldType::VarChar),
            ("String", FieldType::VarChar),
            ("var_char", FieldType::VarChar),
            ("JSON", FieldType::Json),
            ("float_vector", FieldType::FloatVector),
            ("SparseFloatVector", FieldType::SparseFloatVector),
            ("Float16Vector", FieldType::Float16Vector),
            ("bfloat16_vector", FieldType::BFloat16Vector),
            ("BF16Vector", FieldType::BFloat16Vector),
        ];

        for (yaml, expected) in cases {
            let parsed: FieldType = serde_yaml::from_str(yaml).unwrap();
            assert_eq!(parsed, expected, "alias {yaml}");
        }
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result: Result<FieldType, _> = serde_yaml::from_str("Float8Vector");
        assert!(result.is_err());
    }

    #[test]
    fn test_type_categories() {
        assert!(FieldType::Int8.is_integer());
        assert!(FieldType::Double.is_numeric());
        assert!(!FieldType::VarChar.is_numeric());
        assert!(FieldType::BinaryVector.is_vector());
        assert!(FieldType::BFloat16Vector.is_vector());
        assert!(FieldType::Float16Vector.is_dense_float_vector());
        assert!(!FieldType::BinaryVector.is_dense_float_vector());
        assert!(FieldType::VarChar.is_scalar());
        assert!(!FieldType::Json.is_scalar());
        assert!(!FieldType::Array.is_scalar());
    }

    #[test]
    fn test_integer_bounds() {
        assert_eq!(FieldType::Int8.integer_bounds(), Some((-128, 127)));
        assert_eq!(
            FieldType::Int32.integer_bounds(),
            Some((i32::MIN as i64, i32::MAX as i64))
        );
        assert_eq!(FieldType::Float.integer_bounds(), None);
    }

    #[test]
    fn test_serialize_canonical_name() {
        let yaml = serde_yaml::to_string(&FieldType::Json).unwrap();
        assert_eq!(yaml.trim(), "JSON");
    }
}
