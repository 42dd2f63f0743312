//! Row preview: JSON lines written straight to a stream.

use fakegen_core::{Batch, SchemaDefinition};
use fakegen_generator::{BatchSink, CancelToken, DataGenerator, RunConfig, RunSummary, SinkError};
use std::io::Write;

/// Rows shown by `preview` when neither `--rows` nor a config file says otherwise.
pub const DEFAULT_PREVIEW_ROWS: u64 = 10;

/// Sink printing each row as one JSON line.
pub struct LineSink<W: Write> {
    out: W,
}

impl<W: Write> LineSink<W> {
    /// Create a sink writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> BatchSink for LineSink<W> {
    fn accept(&mut self, batch: Batch) -> Result<(), SinkError> {
        for row in &batch.rows {
            serde_json::to_writer(&mut self.out, row).map_err(SinkError::new)?;
            writeln!(self.out).map_err(SinkError::new)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.out.flush().map_err(SinkError::new)
    }
}

/// Generate `config.total_rows` rows and print them to `out`.
pub fn write_preview<W: Write>(
    schema: &SchemaDefinition,
    config: &RunConfig,
    out: W,
) -> Result<RunSummary, fakegen_generator::RunError> {
    let mut generator = DataGenerator::new(schema, config)?;
    generator.run(LineSink::new(out), &CancelToken::new())
}
