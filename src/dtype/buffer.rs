//! HostBuffer: the host-memory form of tensor storage

use super::{DType, Element};
use crate::error::{Error, Result};

/// Flat, contiguous, dtype-tagged host buffer
///
/// Index `i` holds the element at flat (row-major) offset `i`. The variant
/// is the element type tag; a tensor's dtype always names the variant its
/// host buffer uses.
#[derive(Clone, Debug, PartialEq)]
pub enum HostBuffer {
    /// 32-bit floats
    F32(Vec<f32>),
    /// 32-bit signed integers
    I32(Vec<i32>),
    /// Booleans as bytes (0 or 1)
    Bool(Vec<u8>),
}

impl HostBuffer {
    /// Allocate a zero-filled buffer of `len` elements
    pub fn zeros(dtype: DType, len: usize) -> Self {
        match dtype {
            DType::F32 => Self::F32(vec![0.0; len]),
            DType::I32 => Self::I32(vec![0; len]),
            DType::Bool => Self::Bool(vec![0; len]),
        }
    }

    /// Allocate a buffer of `len` copies of `value`, converted to `dtype`
    pub fn full(dtype: DType, len: usize, value: f64) -> Self {
        match dtype {
            DType::F32 => Self::F32(vec![f32::from_f64(value); len]),
            DType::I32 => Self::I32(vec![i32::from_f64(value); len]),
            DType::Bool => Self::Bool(vec![u8::from_f64(value); len]),
        }
    }

    /// Copy a typed slice into a new buffer
    ///
    /// Bool bytes are normalized to 0 or 1.
    pub fn from_slice<T: Element>(values: &[T]) -> Self {
        let mut buffer = T::into_buffer(values.to_vec());
        buffer.normalize();
        buffer
    }

    /// Rebuild a buffer of `len` elements from raw bytes
    ///
    /// `bytes` may be longer than needed (textures are often padded); only
    /// the leading `len * dtype.size_in_bytes()` bytes are read.
    pub fn from_bytes(dtype: DType, len: usize, bytes: &[u8]) -> Result<Self> {
        let needed = len * dtype.size_in_bytes();
        if bytes.len() < needed {
            return Err(Error::Backend(format!(
                "texture holds {} bytes, {} needed for {} {} elements",
                bytes.len(),
                needed,
                len,
                dtype
            )));
        }
        let bytes = &bytes[..needed];

        Ok(match dtype {
            DType::F32 => Self::F32(typed_from_bytes(bytes, len)),
            DType::I32 => Self::I32(typed_from_bytes(bytes, len)),
            DType::Bool => Self::Bool(bytes.iter().map(|&b| u8::from(b != 0)).collect()),
        })
    }

    /// Force every Bool byte to 0 or 1 (no-op for other dtypes)
    pub fn normalize(&mut self) {
        if let Self::Bool(v) = self {
            v.iter_mut().for_each(|b| *b = u8::from(*b != 0));
        }
    }

    /// Element type of this buffer
    #[inline]
    pub fn dtype(&self) -> DType {
        match self {
            Self::F32(_) => DType::F32,
            Self::I32(_) => DType::I32,
            Self::Bool(_) => DType::Bool,
        }
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::F32(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::Bool(v) => v.len(),
        }
    }

    /// Whether the buffer holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// View the contents as raw bytes (for texture uploads)
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::F32(v) => bytemuck::cast_slice(v),
            Self::I32(v) => bytemuck::cast_slice(v),
            Self::Bool(v) => v,
        }
    }

    /// Read element `index` as f64
    pub fn get(&self, index: usize) -> Result<f64> {
        let value = match self {
            Self::F32(v) => v.get(index).map(|x| x.to_f64()),
            Self::I32(v) => v.get(index).map(|x| x.to_f64()),
            Self::Bool(v) => v.get(index).map(|x| x.to_f64()),
        };
        value.ok_or(Error::IndexOutOfBounds {
            index,
            size: self.len(),
        })
    }

    /// Overwrite element `index`, converting `value` to the buffer's dtype
    pub fn set(&mut self, index: usize, value: f64) -> Result<()> {
        let size = self.len();
        if index >= size {
            return Err(Error::IndexOutOfBounds { index, size });
        }
        match self {
            Self::F32(v) => v[index] = f32::from_f64(value),
            Self::I32(v) => v[index] = i32::from_f64(value),
            Self::Bool(v) => v[index] = u8::from_f64(value),
        }
        Ok(())
    }

    /// Add `delta` to element `index`
    pub fn add(&mut self, index: usize, delta: f64) -> Result<()> {
        let current = self.get(index)?;
        self.set(index, current + delta)
    }

    /// Overwrite every element with `value`
    pub fn fill(&mut self, value: f64) {
        match self {
            Self::F32(v) => v.fill(f32::from_f64(value)),
            Self::I32(v) => v.fill(i32::from_f64(value)),
            Self::Bool(v) => v.fill(u8::from_f64(value)),
        }
    }

    /// Overwrite every element with successive values from `sampler`
    pub fn fill_with(&mut self, mut sampler: impl FnMut() -> f64) {
        match self {
            Self::F32(v) => v.iter_mut().for_each(|x| *x = f32::from_f64(sampler())),
            Self::I32(v) => v.iter_mut().for_each(|x| *x = i32::from_f64(sampler())),
            Self::Bool(v) => v.iter_mut().for_each(|x| *x = u8::from_f64(sampler())),
        }
    }

    /// Copy the contents out as a typed vector
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        T::from_buffer(self)
            .map(<[T]>::to_vec)
            .ok_or_else(|| Error::dtype_mismatch(self.dtype(), T::DTYPE))
    }

    /// Copy the contents out as f64 values, whatever the dtype
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            Self::F32(v) => v.iter().map(|x| x.to_f64()).collect(),
            Self::I32(v) => v.iter().map(|x| x.to_f64()).collect(),
            Self::Bool(v) => v.iter().map(|x| x.to_f64()).collect(),
        }
    }
}

/// Allocate with correct alignment for T, then cast to bytes for copy.
/// Casting the source bytes directly would fail on unaligned texture memory.
fn typed_from_bytes<T: Element>(bytes: &[u8], len: usize) -> Vec<T> {
    let mut out = vec![T::zeroed(); len];
    bytemuck::cast_slice_mut::<T, u8>(&mut out).copy_from_slice(bytes);
    out
}
