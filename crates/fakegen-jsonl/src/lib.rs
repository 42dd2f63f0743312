//! JSON Lines output for vecdb-fakegen.
//!
//! This crate writes generated rows as JSONL data files, one JSON object per
//! line in schema field order, and records the run in a `meta.json`
//! manifest next to them.
//!
//! # Example
//!
//! ```ignore
//! use fakegen_core::SchemaDefinition;
//! use fakegen_generator::{CancelToken, RunConfig};
//! use fakegen_jsonl::{write_dataset, OutputOptions};
//!
//! let schema = SchemaDefinition::from_file("schema.yaml")?;
//! let config = RunConfig::new(100_000).with_seed(42);
//! let manifest = write_dataset(&schema, &config, &OutputOptions::new("out"), &CancelToken::new())?;
//! println!("Wrote {} rows in {} files", manifest.generation.rows_written, manifest.files.len());
//! ```

pub mod args;
pub mod error;
pub mod meta;
pub mod sink;
pub mod writer;

pub use args::{CommonGenerateArgs, JsonlGenerateArgs};
pub use error::JsonlError;
pub use meta::{GenerationInfo, Manifest, MANIFEST_FILE};
pub use sink::{DataFile, JsonlSink, ReportCollector, SinkReport, DEFAULT_ROWS_PER_FILE};
pub use writer::{write_dataset, OutputOptions};
