//! vecdb-fakegen library
//!
//! Generates synthetic datasets that conform to a declarative vector-database
//! collection schema: typed scalar fields, JSON documents, dense, binary and
//! sparse vectors, with primary-key uniqueness, cardinality targets, enum
//! domains and partition-key distribution honoured across every row.
//!
//! # Crates
//!
//! - `fakegen_core` - schema model, field types, values, rows, batches
//! - `fakegen_generator` - plan resolution and the batch/stream controller
//! - `fakegen_jsonl` - JSON Lines data files and the `meta.json` manifest
//!
//! # CLI Usage
//!
//! ```bash
//! # Check a schema and print every violation
//! vecdb-fakegen validate --schema collection.yaml
//!
//! # Print a few rows to stdout
//! vecdb-fakegen preview --schema collection.yaml --rows 5 --seed 42
//!
//! # Write 1M rows as JSONL with four workers
//! vecdb-fakegen generate --schema collection.yaml --output-dir out \
//!   --rows 1000000 --seed 42 --workers 4
//! ```

pub mod preview;
pub mod run_config;

pub use fakegen_core::{Batch, FieldDefinition, FieldType, FieldValue, Row, SchemaDefinition};
pub use fakegen_generator::{
    BatchSink, CancelToken, CrossRowScope, DataGenerator, GenerationError, RunConfig, RunError,
    RunSummary, SinkError,
};
pub use fakegen_jsonl::{write_dataset, Manifest, OutputOptions};
pub use preview::{write_preview, LineSink, DEFAULT_PREVIEW_ROWS};
pub use run_config::load_run_config;
