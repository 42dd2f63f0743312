//! Error types for the JSONL writer.

use fakegen_generator::RunError;
use thiserror::Error;

/// Errors that can occur while writing a JSONL dataset.
#[derive(Error, Debug)]
pub enum JsonlError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generation run failed.
    #[error(transparent)]
    Run(#[from] RunError),
}
