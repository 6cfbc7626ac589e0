//! Failure-path coverage: missing files, corrupt metadata, duplicates.

use std::collections::BTreeMap;

use ckpt_common::{CheckpointError, DType, HostOnlyTransfer, TensorValue};
use ckpt_format::{
    encode_property_records, encode_tensor_records, paths, PropertyRecord, TensorRecord,
    TensorStorage,
};
use ckpt_store::{load_checkpoint, read_range, save_checkpoint, SaveOptions};

fn saved_checkpoint() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let tensors = BTreeMap::from([(
        "w".to_string(),
        TensorValue::from_f32s(&[1.0, 2.0], vec![2]).unwrap(),
    )]);
    let properties = BTreeMap::from([("step".to_string(), "10".to_string())]);
    save_checkpoint(dir.path(), &HostOnlyTransfer, &tensors, &properties, &SaveOptions::default())
        .unwrap();
    dir
}

// ---------------------------------------------------------------------------
// Missing and unreadable files
// ---------------------------------------------------------------------------

#[test]
fn missing_properties_file_fails_load_with_no_partial_result() {
    let dir = saved_checkpoint();
    std::fs::remove_file(paths::properties_path(dir.path(), None)).unwrap();

    let err = load_checkpoint(dir.path(), None, None).unwrap_err();
    match err {
        CheckpointError::OpenFailed { path, .. } => {
            assert_eq!(path, paths::properties_path(dir.path(), None));
        }
        other => panic!("expected OpenFailed, got {other}"),
    }
}

#[test]
fn missing_tensors_file_fails_load() {
    let dir = saved_checkpoint();
    std::fs::remove_file(paths::tensors_path(dir.path(), None)).unwrap();

    let err = load_checkpoint(dir.path(), None, None).unwrap_err();
    assert!(matches!(err, CheckpointError::OpenFailed { .. }));
}

#[test]
fn nonexistent_directory_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_checkpoint(&dir.path().join("no_such_ckpt"), None, None).unwrap_err();
    assert!(matches!(err, CheckpointError::OpenFailed { .. }));
}

// ---------------------------------------------------------------------------
// Corrupt metadata
// ---------------------------------------------------------------------------

#[test]
fn truncated_tensor_metadata_is_a_decode_error() {
    let dir = saved_checkpoint();
    let tensors_path = paths::tensors_path(dir.path(), None);
    let bytes = std::fs::read(&tensors_path).unwrap();
    std::fs::write(&tensors_path, &bytes[..bytes.len() - 3]).unwrap();

    let err = load_checkpoint(dir.path(), None, None).unwrap_err();
    assert!(matches!(err, CheckpointError::Decode(_)), "got {err}");
}

#[test]
fn garbage_properties_file_is_a_decode_error() {
    let dir = saved_checkpoint();
    let properties_path = paths::properties_path(dir.path(), None);
    std::fs::write(&properties_path, [0xff; 17]).unwrap();

    let err = load_checkpoint(dir.path(), None, None).unwrap_err();
    assert!(matches!(err, CheckpointError::Decode(_)));
}

// ---------------------------------------------------------------------------
// Duplicate detection on load
// ---------------------------------------------------------------------------

#[test]
fn duplicate_tensor_name_in_metadata_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    let record = TensorRecord {
        name: "w".to_string(),
        dtype: DType::F32,
        shape: vec![1],
        storage: TensorStorage::Inline(1.0f32.to_le_bytes().to_vec()),
    };
    std::fs::write(
        paths::tensors_path(dir.path(), None),
        encode_tensor_records(&[record.clone(), record]),
    )
    .unwrap();
    std::fs::write(paths::properties_path(dir.path(), None), encode_property_records(&[]))
        .unwrap();

    let err = load_checkpoint(dir.path(), None, None).unwrap_err();
    match err {
        CheckpointError::DuplicateName(name) => assert_eq!(name, "w"),
        other => panic!("expected DuplicateName, got {other}"),
    }
}

#[test]
fn duplicate_property_key_in_metadata_fails_load() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(paths::tensors_path(dir.path(), None), encode_tensor_records(&[])).unwrap();
    let records = [
        PropertyRecord { key: "step".to_string(), value: "1".to_string() },
        PropertyRecord { key: "step".to_string(), value: "2".to_string() },
    ];
    std::fs::write(paths::properties_path(dir.path(), None), encode_property_records(&records))
        .unwrap();

    let err = load_checkpoint(dir.path(), None, None).unwrap_err();
    match err {
        CheckpointError::DuplicateKey(key) => assert_eq!(key, "step"),
        other => panic!("expected DuplicateKey, got {other}"),
    }
}

// ---------------------------------------------------------------------------
// External data bounds
// ---------------------------------------------------------------------------

#[test]
fn stale_external_range_is_rejected_after_data_file_shrinks() {
    let dir = tempfile::tempdir().unwrap();
    let tensors = BTreeMap::from([(
        "big".to_string(),
        TensorValue::from_f32s(&[0.0; 8], vec![8]).unwrap(),
    )]);
    let options = SaveOptions { force_external: true, ..Default::default() };
    save_checkpoint(dir.path(), &HostOnlyTransfer, &tensors, &BTreeMap::new(), &options).unwrap();

    let loaded = load_checkpoint(dir.path(), None, None).unwrap();
    let TensorStorage::External { offset, length } = loaded.tensors[0].storage else {
        panic!("expected external storage");
    };

    // Simulate a data file damaged after the metadata was written.
    std::fs::write(&loaded.data_path, [0u8; 8]).unwrap();

    let err = read_range(&loaded.data_path, offset, length).unwrap_err();
    match err {
        CheckpointError::RangeOutOfBounds { offset: o, length: l, file_size } => {
            assert_eq!((o, l, file_size), (offset, length, 8));
        }
        other => panic!("expected RangeOutOfBounds, got {other}"),
    }
}

#[test]
fn load_succeeds_without_touching_data_file() {
    // Metadata-only load must not require the data file to be readable.
    let dir = tempfile::tempdir().unwrap();
    let tensors = BTreeMap::from([(
        "big".to_string(),
        TensorValue::from_f32s(&[0.0; 4], vec![4]).unwrap(),
    )]);
    let options = SaveOptions { force_external: true, ..Default::default() };
    save_checkpoint(dir.path(), &HostOnlyTransfer, &tensors, &BTreeMap::new(), &options).unwrap();

    std::fs::remove_file(paths::tensors_data_path(dir.path(), None)).unwrap();

    let loaded = load_checkpoint(dir.path(), None, None).unwrap();
    assert_eq!(loaded.tensors.len(), 1);
    // Materialization is where the damage surfaces.
    assert!(matches!(
        read_range(&loaded.data_path, 0, 16),
        Err(CheckpointError::OpenFailed { .. })
    ));
}

// ---------------------------------------------------------------------------
// Save failures leave no metadata behind
// ---------------------------------------------------------------------------

#[test]
fn unwritable_directory_fails_save_with_open_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocked = dir.path().join("blocked");
    // A plain file where the checkpoint directory should go.
    std::fs::write(&blocked, b"not a directory").unwrap();

    let err = save_checkpoint(
        &blocked,
        &HostOnlyTransfer,
        &BTreeMap::new(),
        &BTreeMap::new(),
        &SaveOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CheckpointError::OpenFailed { .. }));
}
