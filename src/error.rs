//! Pipeline error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the pipeline stages.
///
/// Only configuration and input-file errors abort a stage. Everything else is
/// recorded against the row or batch it happened to and the stage moves on.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid selector '{0}'")]
    Selector(String),
    #[error("Connection error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("API error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
