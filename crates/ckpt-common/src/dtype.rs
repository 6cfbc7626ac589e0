//! Tensor element types.

/// Discriminant tag for tensor element types.
///
/// Numeric values are the on-disk wire discriminants and must not be
/// reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[non_exhaustive]
pub enum DType {
    F32 = 0,
    F16 = 1,
    F64 = 2,
    BF16 = 3,
    I8 = 4,
    I16 = 5,
    I32 = 6,
    I64 = 7,
    U8 = 8,
    U16 = 9,
    U32 = 10,
    U64 = 11,
    Bool = 12,
}

impl DType {
    /// Convert from the raw u32 discriminant in the file.
    pub const fn from_u32(v: u32) -> Option<Self> {
        match v {
            0 => Some(Self::F32),
            1 => Some(Self::F16),
            2 => Some(Self::F64),
            3 => Some(Self::BF16),
            4 => Some(Self::I8),
            5 => Some(Self::I16),
            6 => Some(Self::I32),
            7 => Some(Self::I64),
            8 => Some(Self::U8),
            9 => Some(Self::U16),
            10 => Some(Self::U32),
            11 => Some(Self::U64),
            12 => Some(Self::Bool),
            _ => None,
        }
    }

    /// Raw wire discriminant.
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Size of one element in bytes.
    pub const fn element_size(self) -> usize {
        match self {
            Self::F32 | Self::I32 | Self::U32 => 4,
            Self::F16 | Self::BF16 | Self::I16 | Self::U16 => 2,
            Self::F64 | Self::I64 | Self::U64 => 8,
            Self::I8 | Self::U8 | Self::Bool => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminant_roundtrip() {
        for n in 0u32..=12 {
            let dt = DType::from_u32(n).expect("missing variant");
            assert_eq!(dt.as_u32(), n);
        }
        assert!(DType::from_u32(13).is_none());
        assert!(DType::from_u32(u32::MAX).is_none());
    }

    #[test]
    fn element_sizes() {
        assert_eq!(DType::F32.element_size(), 4);
        assert_eq!(DType::F64.element_size(), 8);
        assert_eq!(DType::F16.element_size(), 2);
        assert_eq!(DType::BF16.element_size(), 2);
        assert_eq!(DType::I64.element_size(), 8);
        assert_eq!(DType::U8.element_size(), 1);
        assert_eq!(DType::Bool.element_size(), 1);
    }
}
