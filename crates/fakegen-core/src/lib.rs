//! Core types for the vecdb-fakegen data generator.
//!
//! This crate provides the foundational types shared by the generation
//! engine and its sinks:
//!
//! - [`FieldType`] - Closed set of column types a collection may declare
//! - [`SchemaDefinition`] / [`FieldDefinition`] - Validated collection schema
//! - [`FieldValue`] - A single generated value
//! - [`Row`] / [`Batch`] - Transient containers handed to output sinks
//!
//! # Architecture
//!
//! ```text
//! fakegen-core (this crate)
//!    │
//!    ├─── fakegen-generator  (resolves schemas into plans, produces batches)
//!    │
//!    └─── fakegen-jsonl      (writes batches as JSON Lines + meta.json)
//! ```
//!
//! # Example
//!
//! ```rust
//! use fakegen_core::SchemaDefinition;
//!
//! let schema = SchemaDefinition::from_yaml(r#"
//! collection_name: documents
//! fields:
//!   - name: id
//!     type: Int64
//!     is_primary: true
//!     auto_id: true
//!   - name: embedding
//!     type: FloatVector
//!     dim: 128
//! "#).unwrap();
//!
//! assert_eq!(schema.primary_field().unwrap().name, "id");
//! ```

pub mod schema;
pub mod types;
pub mod values;

// Re-exports for convenience
pub use schema::{
    EnumValue, FieldDefinition, Number, SchemaDefinition, SchemaError, Violations,
};
pub use types::FieldType;
pub use values::{Batch, FieldValue, Row};
