//! Tensor and property records and their length-delimited codec.
//!
//! A record stream is a plain concatenation of frames; each frame is a
//! `u32` little-endian body length followed by the record body. There is
//! no global header or trailing count, so a conforming reader can decode
//! an ordered sequence from any well-formed stream and report precisely
//! where a malformed one breaks.

use ckpt_common::{CheckpointError, DType, Result};

use crate::wire;

// Storage-mode discriminants in the tensor record body.
const STORAGE_INLINE: u8 = 0;
const STORAGE_EXTERNAL: u8 = 1;
const STORAGE_MODEL_REF: u8 = 2;

/// Where a tensor record's payload lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TensorStorage {
    /// Payload embedded in the metadata stream.
    Inline(Vec<u8>),
    /// Byte range in the checkpoint's own `tensors.bin`.
    External { offset: u64, length: u64 },
    /// Pass-through reference to data that lives next to the model, not
    /// the checkpoint. The reader returns it unresolved; the caller
    /// resolves `location` against the model's directory.
    ModelRef { location: String, offset: u64, length: u64 },
}

/// Self-describing serialized form of one tensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorRecord {
    pub name: String,
    pub dtype: DType,
    pub shape: Vec<u64>,
    pub storage: TensorStorage,
}

impl TensorRecord {
    /// Payload size in bytes implied by `shape` and `dtype`, or `None`
    /// when the product overflows `u64`.
    pub fn byte_len(&self) -> Option<u64> {
        payload_len(&self.shape, self.dtype)
    }
}

/// Checked `product(shape) * element_size`. Shapes read from a file are
/// untrusted, so the multiplication must not wrap.
fn payload_len(shape: &[u64], dtype: DType) -> Option<u64> {
    let elements = shape.iter().try_fold(1u64, |acc, &dim| acc.checked_mul(dim))?;
    elements.checked_mul(dtype.element_size() as u64)
}

/// One opaque scalar metadata entry (e.g. step counter) stored as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRecord {
    pub key: String,
    pub value: String,
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

fn put_frame(out: &mut Vec<u8>, body: &[u8]) {
    wire::put_u32(out, body.len() as u32);
    out.extend_from_slice(body);
}

fn encode_tensor_body(record: &TensorRecord) -> Vec<u8> {
    let mut body = Vec::new();
    wire::put_string(&mut body, &record.name);
    wire::put_u32(&mut body, record.dtype.as_u32());
    wire::put_u32(&mut body, record.shape.len() as u32);
    for &dim in &record.shape {
        wire::put_u64(&mut body, dim);
    }
    match &record.storage {
        TensorStorage::Inline(bytes) => {
            wire::put_u8(&mut body, STORAGE_INLINE);
            wire::put_bytes(&mut body, bytes);
        }
        TensorStorage::External { offset, length } => {
            wire::put_u8(&mut body, STORAGE_EXTERNAL);
            wire::put_u64(&mut body, *offset);
            wire::put_u64(&mut body, *length);
        }
        TensorStorage::ModelRef { location, offset, length } => {
            wire::put_u8(&mut body, STORAGE_MODEL_REF);
            wire::put_string(&mut body, location);
            wire::put_u64(&mut body, *offset);
            wire::put_u64(&mut body, *length);
        }
    }
    body
}

/// Serialize an ordered tensor-record sequence into one stream.
pub fn encode_tensor_records(records: &[TensorRecord]) -> Vec<u8> {
    let mut out = Vec::new();
    for record in records {
        put_frame(&mut out, &encode_tensor_body(record));
    }
    out
}

/// Serialize an ordered property-record sequence into one stream.
pub fn encode_property_records(records: &[PropertyRecord]) -> Vec<u8> {
    let mut out = Vec::new();
    for record in records {
        let mut body = Vec::new();
        wire::put_string(&mut body, &record.key);
        wire::put_string(&mut body, &record.value);
        put_frame(&mut out, &body);
    }
    out
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Split the next frame off `data`, validating its declared length.
fn read_frame<'d>(data: &'d [u8], offset: &mut usize, index: usize) -> Result<&'d [u8]> {
    let len = wire::read_u32(data, offset).map_err(|_| {
        CheckpointError::Decode(format!(
            "truncated frame header for record {index} at offset {offset}",
            offset = *offset
        ))
    })? as usize;
    let end = offset.checked_add(len).filter(|&e| e <= data.len()).ok_or_else(|| {
        CheckpointError::Decode(format!(
            "record {index} declares {len} bytes but only {} remain",
            data.len() - *offset
        ))
    })?;
    let body = &data[*offset..end];
    *offset = end;
    Ok(body)
}

fn decode_tensor_body(body: &[u8], index: usize) -> Result<TensorRecord> {
    let mut off = 0;
    let name = wire::read_string(body, &mut off)?;

    let raw_dtype = wire::read_u32(body, &mut off)?;
    let dtype = DType::from_u32(raw_dtype).ok_or_else(|| {
        CheckpointError::Decode(format!(
            "tensor record {index} ({name:?}) has unknown element type {raw_dtype}"
        ))
    })?;

    let n_dims = wire::read_u32(body, &mut off)? as usize;
    let mut shape = Vec::with_capacity(n_dims.min(64));
    for _ in 0..n_dims {
        shape.push(wire::read_u64(body, &mut off)?);
    }
    let expected = payload_len(&shape, dtype).ok_or_else(|| {
        CheckpointError::Decode(format!(
            "tensor record {index} ({name:?}) shape {shape:?} of {dtype:?} overflows the payload size"
        ))
    })?;

    let tag = wire::read_u8(body, &mut off)?;
    let storage = match tag {
        STORAGE_INLINE => {
            let bytes = wire::read_bytes(body, &mut off)?;
            if bytes.len() as u64 != expected {
                return Err(CheckpointError::Decode(format!(
                    "tensor record {index} ({name:?}) inline payload is {} bytes, shape {:?} of {:?} needs {expected}",
                    bytes.len(),
                    shape,
                    dtype
                )));
            }
            TensorStorage::Inline(bytes)
        }
        STORAGE_EXTERNAL => {
            let offset = wire::read_u64(body, &mut off)?;
            let length = wire::read_u64(body, &mut off)?;
            TensorStorage::External { offset, length }
        }
        STORAGE_MODEL_REF => {
            let location = wire::read_string(body, &mut off)?;
            let offset = wire::read_u64(body, &mut off)?;
            let length = wire::read_u64(body, &mut off)?;
            TensorStorage::ModelRef { location, offset, length }
        }
        other => {
            return Err(CheckpointError::Decode(format!(
                "tensor record {index} ({name:?}) has unknown storage tag {other}"
            )));
        }
    };

    if off != body.len() {
        return Err(CheckpointError::Decode(format!(
            "tensor record {index} ({name:?}) has {} trailing bytes",
            body.len() - off
        )));
    }

    Ok(TensorRecord { name, dtype, shape, storage })
}

/// Decode an ordered tensor-record sequence from one stream.
pub fn decode_tensor_records(data: &[u8]) -> Result<Vec<TensorRecord>> {
    let mut records = Vec::new();
    let mut offset = 0;
    while offset < data.len() {
        let index = records.len();
        let body = read_frame(data, &mut offset, index)?;
        records.push(decode_tensor_body(body, index)?);
    }
    Ok(records)
}

/// Decode an ordered property-record sequence from one stream.
pub fn decode_property_records(data: &[u8]) -> Result<Vec<PropertyRecord>> {
    let mut records = Vec::new();
    let mut offset = 0;
    while offset < data.len() {
        let index = records.len();
        let body = read_frame(data, &mut offset, index)?;
        let mut off = 0;
        let key = wire::read_string(body, &mut off)?;
        let value = wire::read_string(body, &mut off)?;
        if off != body.len() {
            return Err(CheckpointError::Decode(format!(
                "property record {index} ({key:?}) has {} trailing bytes",
                body.len() - off
            )));
        }
        records.push(PropertyRecord { key, value });
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
