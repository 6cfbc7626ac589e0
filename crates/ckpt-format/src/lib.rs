//! On-disk checkpoint format.
//!
//! A checkpoint is a directory of three files sharing an optional name
//! prefix:
//!
//! ```text
//! checkpoint/
//!   tensors.pbseq    - length-delimited tensor records
//!   tensors.bin      - raw concatenated tensor payloads
//!   properties.pbseq - length-delimited property records
//! ```
//!
//! This crate defines the canonical file paths, the little-endian wire
//! helpers, and the record codec. It performs no file I/O; the `ckpt-store`
//! crate owns that.

pub mod paths;
pub mod record;
pub mod wire;

pub use record::{
    decode_property_records, decode_tensor_records, encode_property_records,
    encode_tensor_records, PropertyRecord, TensorRecord, TensorStorage,
};
