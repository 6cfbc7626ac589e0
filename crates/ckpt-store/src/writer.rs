//! Checkpoint writer: one deterministic pass from maps to directory.

use std::collections::BTreeMap;
use std::path::Path;

use ckpt_common::{CheckpointError, DataTransfer, Result, TensorValue};
use ckpt_format::{
    encode_property_records, encode_tensor_records, paths, PropertyRecord, TensorRecord,
    TensorStorage,
};
use tracing::{debug, info};

use crate::data_file::DataFileWriter;
use crate::extract::extract_tensor;
use crate::file_scope::{with_open_file, FileMode};

/// Per-save configuration.
///
/// Name and key uniqueness is enforced by the input type: the maps passed
/// to [`save_checkpoint`] cannot hold duplicates, and their sorted order
/// fixes the emission order (and therefore the external-data layout).
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    /// Optional shared filename prefix for the three checkpoint files.
    pub prefix: Option<String>,
    /// Keep every tensor payload out of the metadata stream.
    pub force_external: bool,
    /// Tensors of at least this many bytes go to the external data file.
    pub external_size_threshold: Option<u64>,
}

impl SaveOptions {
    fn to_external(&self, value: &TensorValue) -> bool {
        if self.force_external {
            return true;
        }
        match self.external_size_threshold {
            Some(threshold) => value.byte_len() >= threshold,
            None => false,
        }
    }
}

/// Save a checkpoint directory from a tensor map and a property map.
///
/// Tensors are extracted in map order; tensors routed to external storage
/// are appended to `tensors.bin` in that same order, so the first
/// extracted tensor gets the lowest offset. Existing checkpoint files are
/// overwritten. The first failing step aborts the save; files already
/// written stay on disk (callers needing atomicity should save into a
/// temporary directory and rename it).
pub fn save_checkpoint(
    directory: &Path,
    transfer: &dyn DataTransfer,
    tensors: &BTreeMap<String, TensorValue>,
    properties: &BTreeMap<String, String>,
    options: &SaveOptions,
) -> Result<()> {
    let prefix = options.prefix.as_deref();
    let tensors_path = paths::tensors_path(directory, prefix);
    let data_path = paths::tensors_data_path(directory, prefix);
    let properties_path = paths::properties_path(directory, prefix);

    std::fs::create_dir_all(directory).map_err(|source| CheckpointError::OpenFailed {
        path: directory.to_path_buf(),
        source,
    })?;

    info!(
        directory = %directory.display(),
        tensors = tensors.len(),
        properties = properties.len(),
        "saving checkpoint"
    );

    let destinations: Vec<bool> = tensors.values().map(|v| options.to_external(v)).collect();

    // One pass: extract every tensor and append external payloads so the
    // recorded offsets match the final layout of tensors.bin exactly.
    // The data file is always created; it stays empty when every record
    // is inline.
    let records: Vec<TensorRecord> = with_open_file(&data_path, FileMode::Write, |file| {
        let mut data = DataFileWriter::new(file, &data_path);
        tensors
            .iter()
            .zip(&destinations)
            .map(|((name, value), &external)| {
                build_record(name, value, transfer, external, &mut data)
            })
            .collect()
    })?;

    let encoded_tensors = encode_tensor_records(&records);
    with_open_file(&tensors_path, FileMode::Write, |file| {
        use std::io::Write;
        file.write_all(&encoded_tensors).map_err(|source| CheckpointError::WriteFailed {
            path: tensors_path.clone(),
            source,
        })
    })?;

    let property_records: Vec<PropertyRecord> = properties
        .iter()
        .map(|(key, value)| PropertyRecord { key: key.clone(), value: value.clone() })
        .collect();
    let encoded_properties = encode_property_records(&property_records);
    with_open_file(&properties_path, FileMode::Write, |file| {
        use std::io::Write;
        file.write_all(&encoded_properties).map_err(|source| CheckpointError::WriteFailed {
            path: properties_path.clone(),
            source,
        })
    })?;

    info!(directory = %directory.display(), "checkpoint saved");
    Ok(())
}

fn build_record(
    name: &str,
    value: &TensorValue,
    transfer: &dyn DataTransfer,
    external: bool,
    data: &mut DataFileWriter<'_>,
) -> Result<TensorRecord> {
    let extracted = extract_tensor(name, value, transfer, external)?;
    let storage = if external {
        let length = extracted.bytes.len() as u64;
        let offset = data.append(&extracted.bytes)?;
        debug!(tensor = name, offset, length, "external tensor payload appended");
        TensorStorage::External { offset, length }
    } else {
        TensorStorage::Inline(extracted.bytes.into_owned())
    };
    Ok(TensorRecord { name: extracted.name, dtype: extracted.dtype, shape: extracted.shape, storage })
}
