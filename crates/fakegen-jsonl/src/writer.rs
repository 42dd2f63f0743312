//! Writes a whole dataset: data files plus `meta.json`.

use crate::error::JsonlError;
use crate::meta::{GenerationInfo, Manifest};
use crate::sink::{JsonlSink, ReportCollector, SinkReport, DEFAULT_ROWS_PER_FILE};
use fakegen_core::SchemaDefinition;
use fakegen_generator::resolver::effective_partitions;
use fakegen_generator::{
    run_partitioned, CancelToken, CrossRowScope, DataGenerator, RunConfig, RunSummary, SinkError,
};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError};
use tracing::info;

/// Where and how a dataset is written.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Directory receiving data files and `meta.json`
    pub output_dir: PathBuf,
    /// Rows per data file
    pub rows_per_file: u64,
    /// Worker threads
    pub workers: usize,
    /// Cross-row state sharing when `workers > 1`
    pub scope: CrossRowScope,
}

impl OutputOptions {
    /// Single-worker output into `output_dir` with default rotation.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            rows_per_file: DEFAULT_ROWS_PER_FILE,
            workers: 1,
            scope: CrossRowScope::default(),
        }
    }
}

/// Generate `config.total_rows` rows into JSONL files and write the manifest.
pub fn write_dataset(
    schema: &SchemaDefinition,
    config: &RunConfig,
    options: &OutputOptions,
    cancel: &CancelToken,
) -> Result<Manifest, JsonlError> {
    std::fs::create_dir_all(&options.output_dir)?;
    info!(
        "Writing {} rows of '{}' to '{}' with {} worker(s)",
        config.total_rows,
        schema.collection_name,
        options.output_dir.display(),
        options.workers.max(1)
    );

    let (summaries, report) = if options.workers <= 1 {
        write_single(schema, config, options, cancel)?
    } else {
        write_partitioned(schema, config, options, cancel)?
    };

    let rate = report.rows_per_second();
    let first = summaries.first();
    let manifest = Manifest {
        schema: schema.clone(),
        generation: GenerationInfo {
            seed: first.map(|s| s.seed).unwrap_or_default(),
            reproducible: first.is_some_and(|s| s.reproducible),
            total_rows: config.total_rows,
            rows_written: report.rows_written,
            batch_size: config.batch_size,
            workers: summaries.len(),
            num_partitions: effective_partitions(schema, config),
            cancelled: summaries.iter().any(|s| s.cancelled),
        },
        files: report.files,
        rows_per_partition: report.rows_per_partition,
    };
    manifest.write(&options.output_dir)?;

    info!(
        "Dataset complete: {} rows in {} files ({:.2} rows/sec)",
        manifest.generation.rows_written,
        manifest.files.len(),
        rate
    );
    Ok(manifest)
}

fn write_single(
    schema: &SchemaDefinition,
    config: &RunConfig,
    options: &OutputOptions,
    cancel: &CancelToken,
) -> Result<(Vec<RunSummary>, SinkReport), JsonlError> {
    let mut generator = DataGenerator::new(schema, config)?;
    let mut sink = JsonlSink::new(&options.output_dir, "data", options.rows_per_file)?;
    let summary = generator.run(&mut sink, cancel)?;
    Ok((vec![summary], sink.report().clone()))
}

fn write_partitioned(
    schema: &SchemaDefinition,
    config: &RunConfig,
    options: &OutputOptions,
    cancel: &CancelToken,
) -> Result<(Vec<RunSummary>, SinkReport), JsonlError> {
    let collector: ReportCollector = Arc::default();
    let summaries = run_partitioned(
        schema,
        config,
        options.workers,
        options.scope,
        |slice| {
            JsonlSink::new(
                &options.output_dir,
                format!("data-w{:03}", slice.worker),
                options.rows_per_file,
            )
            .map(|sink| sink.reporting_to(slice.worker, Arc::clone(&collector)))
            .map_err(SinkError::new)
        },
        cancel,
    )?;

    let mut reports = std::mem::take(&mut *collector.lock().unwrap_or_else(PoisonError::into_inner));
    reports.sort_by_key(|(worker, _)| *worker);

    let mut merged = SinkReport::default();
    for (_, report) in reports {
        merged.merge(report);
    }
    Ok((summaries, merged))
}
