//! Memory-location descriptor for runtime tensors.

/// Where a tensor's payload currently lives.
///
/// The checkpoint core never talks to a real device; the descriptor only
/// decides whether a payload must go through a [`DataTransfer`] before it
/// can be serialized.
///
/// [`DataTransfer`]: crate::transfer::DataTransfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Device {
    Cpu,
    Cuda(usize),
    Metal,
}

impl Device {
    /// True if payloads on this device are directly host-accessible.
    pub const fn is_host(self) -> bool {
        matches!(self, Self::Cpu)
    }
}
