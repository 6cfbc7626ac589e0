//! The external tensor-data file: sequential appends, positioned reads.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use ckpt_common::{CheckpointError, Result};

use crate::file_scope::{with_open_file, FileMode};

/// Sequential writer for `tensors.bin`.
///
/// Borrows the file handle owned by a scoped accessor; tracks the running
/// byte total so each append can report the offset where its payload
/// starts.
pub struct DataFileWriter<'f> {
    file: &'f mut File,
    path: PathBuf,
    written: u64,
}

impl<'f> DataFileWriter<'f> {
    pub fn new(file: &'f mut File, path: &Path) -> Self {
        Self { file, path: path.to_path_buf(), written: 0 }
    }

    /// Append `bytes` and return the offset where they begin, equal to
    /// the file length before the append.
    pub fn append(&mut self, bytes: &[u8]) -> Result<u64> {
        let offset = self.written;
        self.file.write_all(bytes).map_err(|source| CheckpointError::WriteFailed {
            path: self.path.clone(),
            source,
        })?;
        self.written += bytes.len() as u64;
        Ok(offset)
    }

    /// Total bytes appended so far.
    pub fn len(&self) -> u64 {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }
}

/// Positioned read of `length` bytes at `offset` from the data file.
///
/// Fails with `RangeOutOfBounds` when the requested range does not lie
/// entirely within the file.
pub fn read_range(path: &Path, offset: u64, length: u64) -> Result<Vec<u8>> {
    with_open_file(path, FileMode::Read, |file| {
        let file_size = file
            .metadata()
            .map_err(|source| CheckpointError::ReadFailed { path: path.to_path_buf(), source })?
            .len();
        let end = offset.checked_add(length).filter(|&e| e <= file_size);
        if end.is_none() {
            return Err(CheckpointError::RangeOutOfBounds { offset, length, file_size });
        }

        file.seek(SeekFrom::Start(offset))
            .map_err(|source| CheckpointError::ReadFailed { path: path.to_path_buf(), source })?;
        let mut buf = vec![
            0u8;
            usize::try_from(length).map_err(|_| CheckpointError::RangeOutOfBounds {
                offset,
                length,
                file_size,
            })?
        ];
        file.read_exact(&mut buf)
            .map_err(|source| CheckpointError::ReadFailed { path: path.to_path_buf(), source })?;
        Ok(buf)
    })
}
