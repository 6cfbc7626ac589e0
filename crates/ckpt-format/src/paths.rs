//! Canonical checkpoint file paths.

use std::path::{Path, PathBuf};

/// Base name of the tensor-metadata file.
pub const TENSORS_FILE_NAME: &str = "tensors.pbseq";
/// Base name of the tensor binary-data file.
pub const TENSORS_DATA_FILE_NAME: &str = "tensors.bin";
/// Base name of the properties file.
pub const PROPERTIES_FILE_NAME: &str = "properties.pbseq";

fn prefixed(base: &str, prefix: Option<&str>) -> String {
    match prefix {
        Some(p) if !p.is_empty() => format!("{p}_{base}"),
        _ => base.to_string(),
    }
}

/// Path of the tensor-metadata file inside `dir`.
pub fn tensors_path(dir: &Path, prefix: Option<&str>) -> PathBuf {
    dir.join(prefixed(TENSORS_FILE_NAME, prefix))
}

/// Path of the tensor binary-data file inside `dir`.
pub fn tensors_data_path(dir: &Path, prefix: Option<&str>) -> PathBuf {
    dir.join(prefixed(TENSORS_DATA_FILE_NAME, prefix))
}

/// Path of the properties file inside `dir`.
pub fn properties_path(dir: &Path, prefix: Option<&str>) -> PathBuf {
    dir.join(prefixed(PROPERTIES_FILE_NAME, prefix))
}
