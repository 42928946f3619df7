//! Typed error hierarchy for the specloom engine.
//!
//! The progression engine itself has no fatal error class: a missing
//! record means "nothing to do", malformed artifacts classify as
//! incomplete, and stale transition requests are dropped. What remains
//! is ambient I/O: the status store can fail to read, parse, or write
//! its file, and those failures carry the path they happened at.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the flat-file status store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read status record at {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse status record at {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write status record at {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize status record: {0}")]
    SerializeFailed(#[source] serde_json::Error),
}

/// Errors surfaced by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
