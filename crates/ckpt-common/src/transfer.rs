//! Data-transfer capability: device memory to host memory.

use crate::{CheckpointError, Result, TensorValue};

/// Copies a tensor's payload into freshly allocated host memory.
///
/// The checkpoint core treats this as an opaque, synchronous, blocking
/// call; it is the only way device-resident payloads become
/// serializable. Implementations are supplied by the execution engine
/// that owns the device allocations.
pub trait DataTransfer {
    /// Copy `value`'s payload into a new host buffer.
    ///
    /// Must also work for host-resident values (a plain copy), so the
    /// writer can force an owned buffer with a lifetime independent of
    /// the source tensor.
    fn copy_to_host(&self, value: &TensorValue) -> Result<Vec<u8>>;
}

/// Transfer capability for purely host-resident workloads.
///
/// Device-resident values fail: there is no device runtime to ask.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostOnlyTransfer;

impl DataTransfer for HostOnlyTransfer {
    fn copy_to_host(&self, value: &TensorValue) -> Result<Vec<u8>> {
        match value.host_bytes() {
            Some(bytes) => Ok(bytes.to_vec()),
            None => Err(CheckpointError::Transfer(format!(
                "no transfer backend for device {:?}",
                value.device()
            ))),
        }
    }
}
