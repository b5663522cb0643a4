//! Error types for the generator
//!
//! Only configuration problems and I/O failures are errors. Configuration
//! problems end up in the run's diagnostics; the others are returned.
//! Everything the extractor or renderer cannot understand degrades to
//! skipped nodes or `any`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("out is empty.")]
    MissingOutput,

    #[error("file list is empty")]
    EmptyFileList,

    #[error("{context}: {}", path.display())]
    FileNotFound { context: String, path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid options: {0}")]
    Options(#[from] serde_json::Error),

    #[error("invalid entry pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error(transparent)]
    Parser(#[from] anyhow::Error),
}

impl GenerateError {
    /// Problems with the options or inputs rather than with the run itself
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingOutput | Self::EmptyFileList | Self::FileNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, GenerateError>;
