//! Data type system for ndtex tensors
//!
//! This module provides the `DType` tag carried by every tensor, the
//! `Element` trait mapping Rust types onto it, and `HostBuffer`, the typed
//! host-memory form of tensor storage.

mod buffer;
mod element;

pub use buffer::HostBuffer;
pub use element::Element;

use std::fmt;

/// Data types supported by ndtex tensors
///
/// The tag decides which `HostBuffer` variant is valid for a tensor and how
/// many bytes each element occupies when copied into a texture.
///
/// # Discriminant Values (Serialization Stability)
///
/// Discriminants follow the usual ranges: floats 0-9, signed ints 10-19,
/// bool 30. Existing values are never changed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DType {
    /// 32-bit floating point (most common)
    #[default]
    F32 = 1,
    /// 32-bit signed integer
    I32 = 11,
    /// Boolean stored as one byte (0 or 1)
    Bool = 30,
}

impl DType {
    /// Size of one element in bytes
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::F32 | Self::I32 => 4,
            Self::Bool => 1,
        }
    }

    /// Returns true if this is a floating point type
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32)
    }

    /// Returns true if this is a boolean type
    #[inline]
    pub const fn is_bool(self) -> bool {
        matches!(self, Self::Bool)
    }

    /// Short name for display (e.g., "f32", "bool")
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::F32 => "f32",
            Self::I32 => "i32",
            Self::Bool => "bool",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_sizes() {
        assert_eq!(DType::F32.size_in_bytes(), 4);
        assert_eq!(DType::I32.size_in_bytes(), 4);
        assert_eq!(DType::Bool.size_in_bytes(), 1);
    }

    #[test]
    fn test_dtype_display() {
        assert_eq!(DType::F32.to_string(), "f32");
        assert_eq!(DType::I32.to_string(), "i32");
        assert_eq!(DType::Bool.to_string(), "bool");
        assert_eq!(DType::default(), DType::F32);
    }
}
