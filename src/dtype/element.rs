//! Element trait for mapping Rust types to DType

use super::{DType, HostBuffer};
use bytemuck::{Pod, Zeroable};

/// Trait for types that can be elements of a tensor
///
/// This trait connects Rust's type system to ndtex's runtime dtype system.
/// Booleans use `u8` (0 or 1) since `bool` is not `Pod`.
pub trait Element: Copy + Send + Sync + Pod + Zeroable + PartialEq + 'static {
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Convert to f64 for generic numeric operations
    fn to_f64(self) -> f64;

    /// Convert from f64 to this type
    fn from_f64(v: f64) -> Self;

    /// Wrap a typed vector into a host buffer
    fn into_buffer(values: Vec<Self>) -> HostBuffer;

    /// Borrow the typed contents of a host buffer, if the dtype matches
    fn from_buffer(buffer: &HostBuffer) -> Option<&[Self]>;
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    fn into_buffer(values: Vec<Self>) -> HostBuffer {
        HostBuffer::F32(values)
    }

    fn from_buffer(buffer: &HostBuffer) -> Option<&[Self]> {
        match buffer {
            HostBuffer::F32(v) => Some(v),
            _ => None,
        }
    }
}

impl Element for i32 {
    const DTYPE: DType = DType::I32;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    /// Truncates toward zero (saturating at the i32 range)
    #[inline]
    fn from_f64(v: f64) -> Self {
        v as i32
    }

    fn into_buffer(values: Vec<Self>) -> HostBuffer {
        HostBuffer::I32(values)
    }

    fn from_buffer(buffer: &HostBuffer) -> Option<&[Self]> {
        match buffer {
            HostBuffer::I32(v) => Some(v),
            _ => None,
        }
    }
}

impl Element for u8 {
    const DTYPE: DType = DType::Bool;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    /// Any non-zero value is stored as 1
    #[inline]
    fn from_f64(v: f64) -> Self {
        if v != 0.0 { 1 } else { 0 }
    }

    fn into_buffer(values: Vec<Self>) -> HostBuffer {
        HostBuffer::Bool(values)
    }

    fn from_buffer(buffer: &HostBuffer) -> Option<&[Self]> {
        match buffer {
            HostBuffer::Bool(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_dtypes() {
        assert_eq!(f32::DTYPE, DType::F32);
        assert_eq!(i32::DTYPE, DType::I32);
        assert_eq!(u8::DTYPE, DType::Bool);
    }

    #[test]
    fn test_bool_from_f64() {
        assert_eq!(u8::from_f64(0.0), 0);
        assert_eq!(u8::from_f64(-3.5), 1);
        assert_eq!(u8::from_f64(7.0), 1);
    }

    #[test]
    fn test_i32_truncates() {
        assert_eq!(i32::from_f64(2.9), 2);
        assert_eq!(i32::from_f64(-2.9), -2);
    }
}
