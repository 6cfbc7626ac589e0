//! Scoped file access: open, use, release — on every exit path.

use std::fs::{File, OpenOptions};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use ckpt_common::{CheckpointError, Result};

/// Access mode for [`with_open_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Read,
    /// Create if absent, truncate if present.
    Write,
}

/// Open `path`, run `op` on the handle, and release the handle no matter
/// how `op` exits.
///
/// - Open failure returns `OpenFailed` without invoking `op`.
/// - A panic inside `op` is caught and converted to `OperationFault`
///   carrying the panic message; it never crosses this boundary.
/// - In write mode the release step is `sync_all`, and its failure is
///   reported as `CloseFailed` **only if** `op` succeeded: an operation
///   error is never masked by a secondary close error.
pub fn with_open_file<T>(
    path: &Path,
    mode: FileMode,
    op: impl FnOnce(&mut File) -> Result<T>,
) -> Result<T> {
    let mut file = match mode {
        FileMode::Read => File::open(path),
        FileMode::Write => {
            OpenOptions::new().write(true).create(true).truncate(true).open(path)
        }
    }
    .map_err(|source| CheckpointError::OpenFailed { path: path.to_path_buf(), source })?;

    let op_result = match panic::catch_unwind(AssertUnwindSafe(|| op(&mut file))) {
        Ok(result) => result,
        Err(payload) => Err(CheckpointError::OperationFault(panic_message(&payload))),
    };

    // File close errors are unobservable through drop, so flushing to the
    // device is the release step that can still fail in write mode.
    let close_result = match mode {
        FileMode::Write => file.sync_all(),
        FileMode::Read => Ok(()),
    };
    drop(file);

    resolve_release(path, op_result, close_result)
}

/// Combine the operation and release outcomes. A release failure is
/// reported as `CloseFailed` only when the operation succeeded; the
/// operation's error wins regardless of the close outcome.
fn resolve_release<T>(
    path: &Path,
    op_result: Result<T>,
    close_result: std::io::Result<()>,
) -> Result<T> {
    match (op_result, close_result) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(source)) => {
            Err(CheckpointError::CloseFailed { path: path.to_path_buf(), source })
        }
        (Err(err), _) => Err(err),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
