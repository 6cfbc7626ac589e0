//! Checkpoint reader: decode metadata and properties, keep payloads lazy.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use ckpt_common::{CheckpointError, Result};
use ckpt_format::{decode_property_records, decode_tensor_records, paths, TensorRecord};
use tracing::{debug, info};

use crate::file_scope::{with_open_file, FileMode};

/// A loaded checkpoint: ordered tensor records and the property map.
///
/// Inline records already carry their bytes. External records carry
/// offset/length only; materialize them with
/// [`read_range`](crate::data_file::read_range) against [`Self::data_path`].
/// `ModelRef` records are returned unresolved for the caller to resolve
/// against [`Self::model_path`]. Rebuilding live tensors from records is
/// the execution engine's job, not the store's.
#[derive(Debug)]
pub struct LoadedCheckpoint {
    pub tensors: Vec<TensorRecord>,
    pub properties: BTreeMap<String, String>,
    /// The checkpoint's own binary data file.
    pub data_path: PathBuf,
    /// Base for model-relative external references, if the caller has one.
    pub model_path: Option<PathBuf>,
}

/// Load a checkpoint directory.
///
/// Decodes the tensor-metadata and properties files, validating that
/// tensor names and property keys are unique; the first duplicate fails
/// the load. A missing file surfaces as `OpenFailed`.
pub fn load_checkpoint(
    directory: &Path,
    model_path: Option<&Path>,
    prefix: Option<&str>,
) -> Result<LoadedCheckpoint> {
    let tensors_path = paths::tensors_path(directory, prefix);
    let properties_path = paths::properties_path(directory, prefix);
    let data_path = paths::tensors_data_path(directory, prefix);

    info!(directory = %directory.display(), "loading checkpoint");

    let tensors = decode_tensor_records(&read_whole_file(&tensors_path)?)?;
    let mut seen = std::collections::BTreeSet::new();
    for record in &tensors {
        if !seen.insert(record.name.as_str()) {
            return Err(CheckpointError::DuplicateName(record.name.clone()));
        }
    }

    let property_records = decode_property_records(&read_whole_file(&properties_path)?)?;
    let mut properties = BTreeMap::new();
    for record in property_records {
        if properties.insert(record.key.clone(), record.value).is_some() {
            return Err(CheckpointError::DuplicateKey(record.key));
        }
    }

    debug!(tensors = tensors.len(), properties = properties.len(), "checkpoint decoded");

    Ok(LoadedCheckpoint {
        tensors,
        properties,
        data_path,
        model_path: model_path.map(|p| p.to_path_buf()),
    })
}

fn read_whole_file(path: &Path) -> Result<Vec<u8>> {
    with_open_file(path, FileMode::Read, |file| {
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).map_err(|source| CheckpointError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(buf)
    })
}
