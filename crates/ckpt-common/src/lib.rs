//! Common types for the ckpt checkpoint store
//!
//! This crate provides the foundational types shared across the ckpt
//! workspace: the error enum, the element-type and device descriptors,
//! the runtime tensor value, and the data-transfer capability that moves
//! device-resident payloads into host memory.

pub mod device;
pub mod dtype;
pub mod error;
pub mod tensor;
pub mod transfer;

pub use device::Device;
pub use dtype::DType;
pub use error::{CheckpointError, Result};
pub use tensor::{TensorData, TensorValue};
pub use transfer::{DataTransfer, HostOnlyTransfer};
