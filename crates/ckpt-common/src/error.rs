//! Checkpoint error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while saving or loading a checkpoint.
///
/// Each variant names the stage that failed; the first failure in a
/// multi-step save/load aborts the remaining steps and is returned
/// verbatim to the caller.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("failed to open {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to close {path}: {source}")]
    CloseFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("range [{offset}, {offset}+{length}) exceeds data file size {file_size}")]
    RangeOutOfBounds { offset: u64, length: u64, file_size: u64 },

    #[error("malformed record stream: {0}")]
    Decode(String),

    #[error("duplicate tensor name in checkpoint: {0}")]
    DuplicateName(String),

    #[error("duplicate property key in checkpoint: {0}")]
    DuplicateKey(String),

    #[error("device-to-host transfer failed: {0}")]
    Transfer(String),

    #[error("file operation fault: {0}")]
    OperationFault(String),
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, CheckpointError>;
