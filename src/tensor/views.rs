//! Rank-specialized views: scalar, vector, and matrix
//!
//! Each view wraps a [`Tensor`] of a fixed rank and replaces the stride-table
//! arithmetic with a direct form. They dereference to the wrapped tensor, so
//! the rest of the tensor API (migration, reshape, equality) is shared.

use super::{Indexing, Shape, Tensor, TensorData};
use crate::dtype::{DType, Element, HostBuffer};
use crate::error::{Error, Result};
use crate::runtime::{Context, TexLayout, TextureHandle};
use std::fmt;
use std::ops::Deref;

/// The only texture layout a scalar may occupy
const SCALAR_LAYOUT: TexLayout = TexLayout::new(1, 1);

fn check_view_rank(tensor: &Tensor, expected: usize) -> Result<()> {
    if tensor.rank() != expected {
        return Err(Error::invalid_rank(expected, tensor.rank()));
    }
    Ok(())
}

// ============================================================================
// Scalar
// ============================================================================

/// Rank-0 tensor: exactly one element at offset 0
#[derive(Clone)]
pub struct Scalar(Tensor);

impl Scalar {
    /// Create a scalar from initial data
    ///
    /// A texture must have the `(1, 1)` layout.
    pub fn new(data: TensorData, dtype: DType) -> Result<Self> {
        if let Some(layout) = data.texture_layout {
            if layout != SCALAR_LAYOUT {
                return Err(Error::shape_mismatch(&[1, 1], &[layout.rows, layout.cols]));
            }
        }
        Tensor::new(&[], data, dtype).map(Self)
    }

    /// Create a host-resident scalar holding `value`
    pub fn from_value(value: f64, dtype: DType) -> Self {
        Self(Tensor::full(&[], dtype, value))
    }

    /// View a rank-0 tensor as a scalar (aliases its storage)
    pub fn from_tensor(tensor: Tensor) -> Result<Self> {
        check_view_rank(&tensor, 0)?;
        Ok(Self(tensor))
    }

    pub(super) fn wrap(tensor: Tensor) -> Self {
        Self(tensor)
    }

    /// Read the value
    pub fn get(&self) -> Result<f64> {
        self.0.read_flat(0)
    }

    /// Overwrite the value
    pub fn set(&self, value: f64) -> Result<()> {
        self.0.write_flat(0, value)
    }

    /// Add `delta` to the value
    pub fn add(&self, delta: f64) -> Result<()> {
        self.0.add_flat(0, delta)
    }

    /// Read the value as its element type
    pub fn item<T: Element>(&self) -> Result<T> {
        let values = self.0.to_vec::<T>()?;
        values
            .first()
            .copied()
            .ok_or(Error::IndexOutOfBounds { index: 0, size: 0 })
    }

    /// Retire this scalar; see [`Tensor::dispose`]
    pub fn dispose(&mut self) {
        self.0.dispose();
    }

    /// Move the value into a `(1, 1)` texture (no-op if already there)
    pub fn upload(&self, context: &Context) -> Result<TextureHandle> {
        self.0
            .texture(context, Some(SCALAR_LAYOUT))
            .map(|(handle, _)| handle)
    }

    /// Get the wrapped tensor
    pub fn as_tensor(&self) -> &Tensor {
        &self.0
    }

    /// Unwrap into the generic tensor
    pub fn into_tensor(self) -> Tensor {
        self.0
    }
}

impl Indexing for Scalar {
    fn tensor(&self) -> &Tensor {
        &self.0
    }

    #[inline]
    fn loc_to_index(&self, _locs: &[usize]) -> usize {
        0
    }

    fn index_to_loc(&self, _index: usize) -> Shape {
        Shape::new()
    }
}

// ============================================================================
// Vector
// ============================================================================

/// Rank-1 tensor: the flat offset is the index itself
#[derive(Clone)]
pub struct Vector(Tensor);

impl Vector {
    /// Create a vector from initial data
    ///
    /// The length is taken from the host values, or else from the capacity
    /// of the texture layout.
    pub fn new(data: TensorData, dtype: DType) -> Result<Self> {
        let len = match (&data.values, data.texture_layout) {
            (Some(values), _) => values.len(),
            (None, Some(layout)) => layout.capacity(),
            (None, None) => 0,
        };
        Tensor::new(&[len], data, dtype).map(Self)
    }

    /// Create a host-resident vector from a slice
    pub fn from_slice<T: Element>(values: &[T]) -> Self {
        Self(Tensor::from_parts(
            [values.len()].into(),
            T::DTYPE,
            super::Storage::from_host(HostBuffer::from_slice(values)),
        ))
    }

    /// View a rank-1 tensor as a vector (aliases its storage)
    pub fn from_tensor(tensor: Tensor) -> Result<Self> {
        check_view_rank(&tensor, 1)?;
        Ok(Self(tensor))
    }

    pub(super) fn wrap(tensor: Tensor) -> Self {
        Self(tensor)
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.0.size()
    }

    /// Whether the vector has no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.size() == 0
    }

    /// Read element `i`
    pub fn get(&self, i: usize) -> Result<f64> {
        self.0.read_flat(i)
    }

    /// Overwrite element `i`
    pub fn set(&self, value: f64, i: usize) -> Result<()> {
        self.0.write_flat(i, value)
    }

    /// Add `delta` to element `i`
    pub fn add(&self, delta: f64, i: usize) -> Result<()> {
        self.0.add_flat(i, delta)
    }

    /// Retire this vector; see [`Tensor::dispose`]
    pub fn dispose(&mut self) {
        self.0.dispose();
    }

    /// Get the wrapped tensor
    pub fn as_tensor(&self) -> &Tensor {
        &self.0
    }

    /// Unwrap into the generic tensor
    pub fn into_tensor(self) -> Tensor {
        self.0
    }
}

impl Indexing for Vector {
    fn tensor(&self) -> &Tensor {
        &self.0
    }

    #[inline]
    fn loc_to_index(&self, locs: &[usize]) -> usize {
        locs.first().copied().unwrap_or(0)
    }

    fn index_to_loc(&self, index: usize) -> Shape {
        Shape::from([index])
    }
}

// ============================================================================
// Matrix
// ============================================================================

/// Rank-2 tensor addressed as `row * row_stride + col`
#[derive(Clone)]
pub struct Matrix {
    tensor: Tensor,
    row_stride: usize,
}

impl Matrix {
    /// Create a matrix of `shape` from initial data
    ///
    /// Returns `InvalidRank` unless `shape` has exactly two dimensions.
    pub fn new(shape: &[usize], data: TensorData, dtype: DType) -> Result<Self> {
        if shape.len() != 2 {
            return Err(Error::invalid_rank(2, shape.len()));
        }
        Tensor::new(shape, data, dtype).map(Self::wrap)
    }

    /// Create a host-resident matrix of `rows x cols` from row-major values
    pub fn from_slice<T: Element>(values: &[T], rows: usize, cols: usize) -> Result<Self> {
        Tensor::from_slice(values, &[rows, cols]).map(Self::wrap)
    }

    /// View a rank-2 tensor as a matrix (aliases its storage)
    pub fn from_tensor(tensor: Tensor) -> Result<Self> {
        check_view_rank(&tensor, 2)?;
        Ok(Self::wrap(tensor))
    }

    pub(super) fn wrap(tensor: Tensor) -> Self {
        let row_stride = tensor.strides().first().copied().unwrap_or(0);
        Self { tensor, row_stride }
    }

    /// Number of rows (0 once disposed)
    #[inline]
    pub fn rows(&self) -> usize {
        self.tensor.shape().first().copied().unwrap_or(0)
    }

    /// Number of columns (0 once disposed)
    #[inline]
    pub fn cols(&self) -> usize {
        self.row_stride
    }

    /// Read the element at `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.tensor.read_flat(row * self.row_stride + col)
    }

    /// Overwrite the element at `(row, col)`
    pub fn set(&self, value: f64, row: usize, col: usize) -> Result<()> {
        self.tensor.write_flat(row * self.row_stride + col, value)
    }

    /// Add `delta` to the element at `(row, col)`
    pub fn add(&self, delta: f64, row: usize, col: usize) -> Result<()> {
        self.tensor.add_flat(row * self.row_stride + col, delta)
    }

    /// Retire this matrix; see [`Tensor::dispose`]
    pub fn dispose(&mut self) {
        self.tensor.dispose();
        self.row_stride = 0;
    }

    /// Get the wrapped tensor
    pub fn as_tensor(&self) -> &Tensor {
        &self.tensor
    }

    /// Unwrap into the generic tensor
    pub fn into_tensor(self) -> Tensor {
        self.tensor
    }
}

impl Indexing for Matrix {
    fn tensor(&self) -> &Tensor {
        &self.tensor
    }

    #[inline]
    fn loc_to_index(&self, locs: &[usize]) -> usize {
        match *locs {
            [row, col] => row * self.row_stride + col,
            _ => self.tensor.loc_to_index(locs),
        }
    }

    fn index_to_loc(&self, index: usize) -> Shape {
        // A zero row stride means zero columns, so no offset is valid.
        let row = index.checked_div(self.row_stride).unwrap_or(0);
        let col = index.checked_rem(self.row_stride).unwrap_or(0);
        Shape::from([row, col])
    }
}

// ============================================================================
// Shared impls
// ============================================================================

macro_rules! impl_view {
    ($view:ident, $field:tt, $name:literal) => {
        impl Deref for $view {
            type Target = Tensor;

            fn deref(&self) -> &Tensor {
                &self.$field
            }
        }

        impl From<$view> for Tensor {
            fn from(view: $view) -> Tensor {
                view.$field
            }
        }

        impl fmt::Debug for $view {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple($name).field(&self.$field).finish()
            }
        }
    };
}

impl_view!(Scalar, 0, "Scalar");
impl_view!(Vector, 0, "Vector");
impl_view!(Matrix, tensor, "Matrix");

impl Tensor {
    /// View as a scalar, sharing storage
    ///
    /// Returns `InvalidRank` unless the tensor has rank 0.
    pub fn as_scalar(&self) -> Result<Scalar> {
        Scalar::from_tensor(self.clone())
    }

    /// View as a vector, sharing storage
    ///
    /// Returns `InvalidRank` unless the tensor has rank 1.
    pub fn as_vector(&self) -> Result<Vector> {
        Vector::from_tensor(self.clone())
    }

    /// View as a matrix, sharing storage
    ///
    /// Returns `InvalidRank` unless the tensor has rank 2.
    pub fn as_matrix(&self) -> Result<Matrix> {
        Matrix::from_tensor(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar() {
        let s = Scalar::from_value(2.0, DType::F32);
        assert_eq!(s.rank(), 0);
        s.add(0.5).unwrap();
        assert_eq!(s.get().unwrap(), 2.5);
        s.set(-1.0).unwrap();
        assert_eq!(s.item::<f32>().unwrap(), -1.0);
        assert!(s.item::<i32>().is_err());
    }

    #[test]
    fn test_scalar_rejects_layout() {
        let ctx = Context::new();
        let data = TensorData::texture(&ctx, TextureHandle::from_raw(1), TexLayout::new(1, 2));
        assert!(matches!(
            Scalar::new(data, DType::F32),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_vector_shape_from_values() {
        let v = Vector::new(TensorData::values(HostBuffer::I32(vec![3, 1, 4])), DType::I32).unwrap();
        assert_eq!(v.shape(), &[3]);
        assert_eq!(v.len(), 3);
        v.set(5.0, 1).unwrap();
        assert_eq!(v.get(1).unwrap(), 5.0);
        assert_eq!(v.loc_to_index(&[2]), 2);
        assert_eq!(Indexing::index_to_loc(&v, 2).as_slice(), &[2]);
    }

    #[test]
    fn test_matrix_indexing() {
        let m = Matrix::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.get(1, 2).unwrap(), 6.0);
        assert_eq!(Indexing::loc_to_index(&m, &[1, 1]), 4);
        assert_eq!(Indexing::index_to_loc(&m, 5).as_slice(), &[1, 2]);
    }

    #[test]
    fn test_matrix_invalid_rank() {
        let data = TensorData::values(HostBuffer::F32(vec![0.0; 8]));
        assert!(matches!(
            Matrix::new(&[2, 2, 2], data, DType::F32),
            Err(Error::InvalidRank {
                expected: 2,
                got: 3
            })
        ));
        let t = Tensor::zeros(&[4], DType::F32);
        assert!(t.as_matrix().is_err());
    }

    #[test]
    fn test_views_alias_storage() {
        let t = Tensor::zeros(&[2, 2], DType::F32);
        let m = t.as_matrix().unwrap();
        m.set(7.0, 1, 0).unwrap();
        assert_eq!(t.get(&[1, 0]).unwrap(), 7.0);
        assert_eq!(t.alias_count(), 2);
    }

    #[test]
    fn test_dispose_views() {
        let mut s = Scalar::from_value(1.0, DType::F32);
        s.dispose();
        assert!(s.is_disposed());
        assert!(matches!(s.get(), Err(Error::Disposed)));

        let mut v = Vector::from_slice(&[1i32, 2]);
        v.dispose();
        assert!(v.is_empty());
        assert!(matches!(v.get(0), Err(Error::Disposed)));

        let mut m = Matrix::from_slice(&[1.0f32, 2.0, 3.0, 4.0], 2, 2).unwrap();
        m.dispose();
        assert_eq!((m.rows(), m.cols()), (0, 0));
        assert!(matches!(m.get(0, 0), Err(Error::Disposed)));
        m.dispose();
    }

    #[test]
    fn test_indexing_arity() {
        let m = Matrix::from_slice(&[1i32, 2, 3, 4], 2, 2).unwrap();
        assert!(matches!(
            m.get_at(&[1]),
            Err(Error::InvalidRank {
                expected: 2,
                got: 1
            })
        ));
        assert_eq!(m.get_at(&[1, 1]).unwrap(), 4.0);
    }
}
