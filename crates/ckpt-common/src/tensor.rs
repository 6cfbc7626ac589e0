//! Runtime tensor values handed to the checkpoint writer.

use crate::{CheckpointError, DType, Device, Result};

/// Payload of a runtime tensor: host bytes, or an opaque device
/// allocation that only the caller's [`DataTransfer`] understands.
///
/// [`DataTransfer`]: crate::transfer::DataTransfer
#[derive(Debug, Clone)]
pub enum TensorData {
    /// Host-resident bytes, usable directly.
    Host(Vec<u8>),
    /// Device-resident allocation. `handle` identifies the allocation to
    /// the data-transfer capability; `len` is the payload size in bytes.
    Device { device: Device, handle: u64, len: u64 },
}

/// An in-memory named-map entry: element type, shape, and payload.
///
/// The checkpoint core never retains these beyond a single save call.
#[derive(Debug, Clone)]
pub struct TensorValue {
    dtype: DType,
    shape: Vec<u64>,
    data: TensorData,
}

impl TensorValue {
    /// Build a tensor value from raw host bytes, validating that the
    /// payload length matches `shape` and `dtype`.
    pub fn from_bytes(dtype: DType, shape: Vec<u64>, bytes: Vec<u8>) -> Result<Self> {
        let expected = checked_byte_len(&shape, dtype)?;
        if bytes.len() as u64 != expected {
            return Err(CheckpointError::Decode(format!(
                "payload length {} does not match shape {:?} of {:?} (expected {} bytes)",
                bytes.len(),
                shape,
                dtype,
                expected
            )));
        }
        Ok(Self { dtype, shape, data: TensorData::Host(bytes) })
    }

    /// Build a tensor value referencing a device-resident allocation.
    ///
    /// `len` must be the payload size in bytes; it is validated against
    /// `shape` and `dtype` the same way as host payloads.
    pub fn from_device(
        dtype: DType,
        shape: Vec<u64>,
        device: Device,
        handle: u64,
        len: u64,
    ) -> Result<Self> {
        let expected = checked_byte_len(&shape, dtype)?;
        if len != expected {
            return Err(CheckpointError::Decode(format!(
                "device payload length {} does not match shape {:?} of {:?} (expected {} bytes)",
                len, shape, dtype, expected
            )));
        }
        Ok(Self { dtype, shape, data: TensorData::Device { device, handle, len } })
    }

    /// Host f32 tensor from a typed slice.
    pub fn from_f32s(values: &[f32], shape: Vec<u64>) -> Result<Self> {
        Self::from_bytes(DType::F32, shape, bytemuck::cast_slice(values).to_vec())
    }

    /// Host f64 tensor from a typed slice.
    pub fn from_f64s(values: &[f64], shape: Vec<u64>) -> Result<Self> {
        Self::from_bytes(DType::F64, shape, bytemuck::cast_slice(values).to_vec())
    }

    /// Host i64 tensor from a typed slice.
    pub fn from_i64s(values: &[i64], shape: Vec<u64>) -> Result<Self> {
        Self::from_bytes(DType::I64, shape, bytemuck::cast_slice(values).to_vec())
    }

    /// Scalar (zero-dimensional) host f32 tensor.
    pub fn scalar_f32(value: f32) -> Self {
        Self {
            dtype: DType::F32,
            shape: Vec::new(),
            data: TensorData::Host(value.to_le_bytes().to_vec()),
        }
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    /// Number of elements; an empty shape denotes a scalar (one element).
    pub fn element_count(&self) -> u64 {
        element_count(&self.shape)
    }

    /// Payload size in bytes.
    pub fn byte_len(&self) -> u64 {
        match &self.data {
            TensorData::Host(bytes) => bytes.len() as u64,
            TensorData::Device { len, .. } => *len,
        }
    }

    pub fn device(&self) -> Device {
        match &self.data {
            TensorData::Host(_) => Device::Cpu,
            TensorData::Device { device, .. } => *device,
        }
    }

    pub fn is_host(&self) -> bool {
        matches!(self.data, TensorData::Host(_))
    }

    /// Direct view of the payload when it is host-resident.
    pub fn host_bytes(&self) -> Option<&[u8]> {
        match &self.data {
            TensorData::Host(bytes) => Some(bytes),
            TensorData::Device { .. } => None,
        }
    }

    pub fn data(&self) -> &TensorData {
        &self.data
    }
}

fn element_count(shape: &[u64]) -> u64 {
    shape.iter().product()
}

// Shapes are caller-supplied; reject a product that wraps u64 instead of
// validating against a wrapped size.
fn checked_byte_len(shape: &[u64], dtype: DType) -> Result<u64> {
    shape
        .iter()
        .try_fold(1u64, |acc, &dim| acc.checked_mul(dim))
        .and_then(|elements| elements.checked_mul(dtype.element_size() as u64))
        .ok_or_else(|| {
            CheckpointError::Decode(format!(
                "shape {shape:?} of {dtype:?} overflows the payload size"
            ))
        })
}
