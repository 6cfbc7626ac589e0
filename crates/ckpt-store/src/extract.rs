//! Tensor value extraction: turn a runtime tensor into serializable form.

use std::borrow::Cow;

use ckpt_common::{DataTransfer, DType, Result, TensorValue};

/// A tensor reduced to host-accessible bytes plus its metadata, ready for
/// the writer to turn into a record.
#[derive(Debug)]
pub struct ExtractedTensor<'v> {
    pub name: String,
    pub dtype: DType,
    pub shape: Vec<u64>,
    /// Host view of the payload. Borrowed only for host-resident tensors
    /// kept inline; owned whenever the bytes came through the transfer
    /// capability.
    pub bytes: Cow<'v, [u8]>,
    /// True if the payload goes to the external data file instead of the
    /// metadata stream.
    pub external: bool,
}

/// Obtain a host-accessible byte view of `value`.
///
/// Device-resident payloads always go through `transfer`. Host-resident
/// payloads are borrowed directly — unless the destination is external,
/// in which case they are copied through `transfer`'s generic path so the
/// resulting buffer's lifetime is independent of the source tensor.
pub fn extract_tensor<'v>(
    name: &str,
    value: &'v TensorValue,
    transfer: &dyn DataTransfer,
    to_external: bool,
) -> Result<ExtractedTensor<'v>> {
    let bytes: Cow<'v, [u8]> = match value.host_bytes() {
        Some(host) if !to_external => Cow::Borrowed(host),
        _ => Cow::Owned(transfer.copy_to_host(value)?),
    };

    Ok(ExtractedTensor {
        name: name.to_string(),
        dtype: value.dtype(),
        shape: value.shape().to_vec(),
        bytes,
        external: to_external,
    })
}
