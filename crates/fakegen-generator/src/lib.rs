//! Constraint-aware row generation engine for vecdb-fakegen.
//!
//! This crate turns a validated [`SchemaDefinition`](fakegen_core::SchemaDefinition)
//! into a deterministic, memory-bounded stream of rows. Every field is
//! compiled once into a [`FieldPlan`]; rows are assembled from the plans and
//! handed to a [`BatchSink`] one batch at a time.
//!
//! # Architecture
//!
//! ```text
//! SchemaDefinition + RunConfig
//!        │
//!        ▼
//! ┌──────────────────┐     ┌───────────────────────────────┐
//! │ resolver         │────▶│ FieldPlan (per field)         │
//! │                  │     │  - Sequence / Choice / Pool   │
//! │                  │     │  - UniqueRandom / Direct      │
//! └──────────────────┘     │  - null probability           │
//!                          │  - partition assigner         │
//!                          └──────────────┬────────────────┘
//!                                         │
//!                                         ▼
//! ┌──────────────────┐     ┌───────────────────────────────┐
//! │  DataGenerator   │────▶│ assemble_row (stream i → row) │
//! │  - seed          │     └───────────────────────────────┘
//! │  - row streams   │
//! │  - index         │────▶ Batch ────▶ BatchSink
//! └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use fakegen_core::SchemaDefinition;
//! use fakegen_generator::{CancelToken, CollectSink, DataGenerator, RunConfig};
//!
//! let schema = SchemaDefinition::from_yaml(r#"
//! collection_name: documents
//! fields:
//!   - name: id
//!     type: Int64
//!     is_primary: true
//!     auto_id: true
//!   - name: title
//!     type: VarChar
//!     max_length: 100
//! "#).unwrap();
//!
//! let config = RunConfig::new(10).with_seed(42);
//! let mut generator = DataGenerator::new(&schema, &config).unwrap();
//! let mut sink = CollectSink::new();
//! let summary = generator.run(&mut sink, &CancelToken::new()).unwrap();
//! assert_eq!(summary.rows, 10);
//! ```
//!
//! # Strategies
//!
//! - `Sequence` - `auto_id` primary keys, `id_base + row_index`
//! - `Choice` - uniform or weighted draw from `enum_values`
//! - `Pool` - draw with replacement from `max(1, round(ratio × rows))` values
//! - `UniqueRandom` - collision-checked primary keys
//! - `Direct` - bounded random value for the field type

pub mod assembler;
pub mod config;
pub mod error;
pub mod generator;
pub mod generators;
pub mod partition;
pub mod plan;
pub mod pool;
pub mod resolver;
pub mod rng;
pub mod sink;
pub mod unique;

// Re-exports for convenience
pub use config::{JsonShape, RunConfig};
pub use error::{GenerationError, RunError};
pub use generator::{
    run_partitioned, split_rows, CancelToken, CrossRowScope, DataGenerator, KeyScope, PoolScope,
    RowIterator, RunContext, RunSummary, WorkerSlice,
};
pub use generators::{ValueGenerator, ValueSpec};
pub use plan::{FieldPlan, Strategy};
pub use resolver::{resolve_field, resolve_schema, ResolveContext};
pub use rng::ResolvedSeed;
pub use sink::{BatchSink, CollectSink, SinkError};
