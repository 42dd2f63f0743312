//! Error types for the generation engine.

use crate::sink::SinkError;
use fakegen_core::SchemaError;

/// Errors raised while resolving plans or producing rows.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Random-mode uniqueness ran out of retries.
    #[error(
        "exhausted keyspace for field '{field}': no unused value after {attempts} attempts{}",
        describe_row(.row_index)
    )]
    ExhaustedKeyspace {
        /// Field whose values collided
        field: String,
        /// Draws made before giving up
        attempts: u32,
        /// Row being generated, `None` while building a cardinality pool
        row_index: Option<u64>,
    },

    /// The schema and run configuration cannot produce valid data.
    #[error("invalid configuration{}: {reason}", describe_field(.field))]
    InvalidConfiguration {
        /// Field the problem belongs to, if any
        field: Option<String>,
        /// What is wrong
        reason: String,
    },
}

fn describe_row(row_index: &Option<u64>) -> String {
    row_index
        .map(|index| format!(" at row {index}"))
        .unwrap_or_else(|| " while building its value pool".to_string())
}

fn describe_field(field: &Option<String>) -> String {
    field
        .as_ref()
        .map(|name| format!(" for field '{name}'"))
        .unwrap_or_default()
}

impl GenerationError {
    /// Run-level configuration problem.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: None,
            reason: reason.into(),
        }
    }

    /// Configuration problem tied to one field.
    pub fn field_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: Some(field.into()),
            reason: reason.into(),
        }
    }
}

/// Anything that can abort a run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The schema was rejected.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Plan resolution or row generation failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The sink rejected a batch; passed through unchanged.
    #[error(transparent)]
    Sink(#[from] SinkError),
}
