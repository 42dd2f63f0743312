//! Rotating JSON Lines sink.

use crate::error::JsonlError;
use fakegen_core::Batch;
use fakegen_generator::{BatchSink, SinkError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default buffer size for JSONL writing.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Default number of rows per data file.
pub const DEFAULT_ROWS_PER_FILE: u64 = 1_000_000;

/// One data file and the rows it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFile {
    /// File name relative to the output directory
    pub name: String,
    /// Rows written to the file
    pub rows: u64,
}

/// What a sink wrote.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SinkReport {
    /// Data files in write order
    pub files: Vec<DataFile>,
    /// Rows written per partition
    pub rows_per_partition: BTreeMap<u32, u64>,
    /// Rows written in total
    pub rows_written: u64,
    /// Time between the first batch and `finish`
    pub total_duration: Duration,
}

impl SinkReport {
    /// Calculate rows per second.
    pub fn rows_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.rows_written as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: SinkReport) {
        self.files.extend(other.files);
        for (partition, rows) in other.rows_per_partition {
            *self.rows_per_partition.entry(partition).or_default() += rows;
        }
        self.rows_written += other.rows_written;
        self.total_duration = self.total_duration.max(other.total_duration);
    }
}

/// Where finished sinks leave their reports when run on worker threads.
pub type ReportCollector = Arc<Mutex<Vec<(usize, SinkReport)>>>;

/// Sink writing rows as JSON Lines, rotating files every `rows_per_file` rows.
///
/// Files are named `<stem>-00000.jsonl`, `<stem>-00001.jsonl`, ... inside the
/// output directory. Each line is one row as a JSON object in schema field
/// order.
pub struct JsonlSink {
    dir: PathBuf,
    stem: String,
    rows_per_file: u64,
    writer: Option<BufWriter<File>>,
    report: SinkReport,
    started: Option<Instant>,
    collector: Option<(usize, ReportCollector)>,
}

impl JsonlSink {
    /// Create a sink writing into `dir` (created if missing).
    pub fn new<P: AsRef<Path>>(
        dir: P,
        stem: impl Into<String>,
        rows_per_file: u64,
    ) -> Result<Self, JsonlError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            stem: stem.into(),
            rows_per_file: rows_per_file.max(1),
            writer: None,
            report: SinkReport::default(),
            started: None,
            collector: None,
        })
    }

    /// Hand the report to `collector` under `worker` when the sink finishes.
    pub fn reporting_to(mut self, worker: usize, collector: ReportCollector) -> Self {
        self.collector = Some((worker, collector));
        self
    }

    /// What has been written so far.
    pub fn report(&self) -> &SinkReport {
        &self.report
    }

    fn rotate(&mut self) -> Result<(), JsonlError> {
        self.close_current()?;
        let name = format!("{}-{:05}.jsonl", self.stem, self.report.files.len());
        let path = self.dir.join(&name);
        debug!("Opening data file '{}'", path.display());
        let file = File::create(&path)?;
        self.writer = Some(BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file));
        self.report.files.push(DataFile { name, rows: 0 });
        Ok(())
    }

    fn close_current(&mut self) -> Result<(), JsonlError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }

    fn write_batch(&mut self, batch: &Batch) -> Result<(), JsonlError> {
        self.started.get_or_insert_with(Instant::now);

        for row in &batch.rows {
            let full = self
                .report
                .files
                .last()
                .map_or(true, |file| file.rows >= self.rows_per_file);
            if full || self.writer.is_none() {
                self.rotate()?;
            }

            if let Some(writer) = self.writer.as_mut() {
                serde_json::to_writer(&mut *writer, row)?;
                writeln!(writer)?;
            }
            if let Some(file) = self.report.files.last_mut() {
                file.rows += 1;
            }
            if let Some(partition) = row.partition {
                *self.report.rows_per_partition.entry(partition).or_default() += 1;
            }
            self.report.rows_written += 1;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), JsonlError> {
        self.close_current()?;
        self.report.total_duration = self
            .started
            .map(|started| started.elapsed())
            .unwrap_or_default();

        info!(
            "JSONL sink finished: {} rows in {} files in {:?} ({:.2} rows/sec)",
            self.report.rows_written,
            self.report.files.len(),
            self.report.total_duration,
            self.report.rows_per_second()
        );

        if let Some((worker, collector)) = &self.collector {
            collector
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((*worker, self.report.clone()));
        }
        Ok(())
    }
}

impl BatchSink for JsonlSink {
    fn accept(&mut self, batch: Batch) -> Result<(), SinkError> {
        self.write_batch(&batch).map_err(SinkError::new)
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.close().map_err(SinkError::new)
    }
}
