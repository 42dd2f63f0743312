//! `meta.json` dataset manifest.
//!
//! Written next to the data files once a run finishes. It carries the schema
//! the rows were generated from, the seed needed to regenerate them, and the
//! file and partition layout so loaders do not have to scan the data.

use crate::error::JsonlError;
use crate::sink::DataFile;
use fakegen_core::SchemaDefinition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// File name of the manifest inside the output directory.
pub const MANIFEST_FILE: &str = "meta.json";

/// How the dataset was generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationInfo {
    /// Seed used for the run
    pub seed: u64,
    /// False when the seed came from the wall clock
    pub reproducible: bool,
    /// Rows requested
    pub total_rows: u64,
    /// Rows actually written
    pub rows_written: u64,
    /// Rows per batch
    pub batch_size: usize,
    /// Worker threads used
    pub workers: usize,
    /// Partition count rows were assigned over
    pub num_partitions: u32,
    /// Whether the run was cancelled before writing every row
    pub cancelled: bool,
}

/// Contents of `meta.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Schema the rows conform to
    pub schema: SchemaDefinition,
    /// Run parameters
    pub generation: GenerationInfo,
    /// Data files in row order
    pub files: Vec<DataFile>,
    /// Rows per partition (empty without a partition key)
    pub rows_per_partition: BTreeMap<u32, u64>,
}

impl Manifest {
    /// Write the manifest into `dir`.
    pub fn write<P: AsRef<Path>>(&self, dir: P) -> Result<(), JsonlError> {
        let file = File::create(dir.as_ref().join(MANIFEST_FILE))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Read the manifest from `dir`.
    pub fn read<P: AsRef<Path>>(dir: P) -> Result<Self, JsonlError> {
        let file = File::open(dir.as_ref().join(MANIFEST_FILE))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
