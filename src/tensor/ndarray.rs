//! Rank-dispatching tensor constructor

use super::{Indexing, Matrix, Scalar, Shape, Tensor, TensorData, Vector};
use crate::dtype::DType;
use crate::error::Result;
use std::ops::Deref;

/// A tensor specialized by rank
///
/// Construction inspects the shape length and picks the view with the
/// cheapest index arithmetic; every variant honors the same [`Indexing`]
/// contract.
///
/// # Example
///
/// ```
/// use ndtex::dtype::DType;
/// use ndtex::tensor::{Indexing, NdArray};
///
/// let m = NdArray::zeros(&[2, 3], DType::F32);
/// assert!(matches!(m, NdArray::Matrix(_)));
/// m.set_at(4.0, &[1, 2]).unwrap();
/// assert_eq!(m.get_at(&[1, 2]).unwrap(), 4.0);
/// ```
#[derive(Clone, Debug)]
pub enum NdArray {
    /// Rank 0
    Scalar(Scalar),
    /// Rank 1
    Vector(Vector),
    /// Rank 2
    Matrix(Matrix),
    /// Any other rank
    Nd(Tensor),
}

impl NdArray {
    /// Create a tensor of `shape` from initial data, specialized by rank
    ///
    /// Fails exactly as [`Tensor::new`] does.
    pub fn new(shape: &[usize], data: TensorData, dtype: DType) -> Result<Self> {
        match shape.len() {
            0 => Scalar::new(data, dtype).map(Self::Scalar),
            _ => Tensor::new(shape, data, dtype).map(Self::from),
        }
    }

    /// Create a zero-filled tensor, specialized by rank
    pub fn zeros(shape: &[usize], dtype: DType) -> Self {
        Self::from(Tensor::zeros(shape, dtype))
    }

    /// Get the underlying generic tensor
    pub fn as_tensor(&self) -> &Tensor {
        match self {
            Self::Scalar(s) => s.as_tensor(),
            Self::Vector(v) => v.as_tensor(),
            Self::Matrix(m) => m.as_tensor(),
            Self::Nd(t) => t,
        }
    }

    /// Unwrap into the generic tensor
    pub fn into_tensor(self) -> Tensor {
        match self {
            Self::Scalar(s) => s.into_tensor(),
            Self::Vector(v) => v.into_tensor(),
            Self::Matrix(m) => m.into_tensor(),
            Self::Nd(t) => t,
        }
    }

    /// Retire this array; see [`Tensor::dispose`]
    pub fn dispose(&mut self) {
        match self {
            Self::Scalar(s) => s.dispose(),
            Self::Vector(v) => v.dispose(),
            Self::Matrix(m) => m.dispose(),
            Self::Nd(t) => t.dispose(),
        }
    }

    fn indexer(&self) -> &dyn Indexing {
        match self {
            Self::Scalar(s) => s,
            Self::Vector(v) => v,
            Self::Matrix(m) => m,
            Self::Nd(t) => t,
        }
    }
}

impl From<Tensor> for NdArray {
    fn from(tensor: Tensor) -> Self {
        match tensor.rank() {
            0 => Self::Scalar(Scalar::wrap(tensor)),
            1 => Self::Vector(Vector::wrap(tensor)),
            2 => Self::Matrix(Matrix::wrap(tensor)),
            _ => Self::Nd(tensor),
        }
    }
}

impl From<NdArray> for Tensor {
    fn from(array: NdArray) -> Tensor {
        array.into_tensor()
    }
}

impl Deref for NdArray {
    type Target = Tensor;

    fn deref(&self) -> &Tensor {
        self.as_tensor()
    }
}

impl Indexing for NdArray {
    fn tensor(&self) -> &Tensor {
        self.as_tensor()
    }

    fn loc_to_index(&self, locs: &[usize]) -> usize {
        self.indexer().loc_to_index(locs)
    }

    fn index_to_loc(&self, index: usize) -> Shape {
        self.indexer().index_to_loc(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::HostBuffer;
    use crate::error::Error;

    #[test]
    fn test_dispatch_by_rank() {
        assert!(matches!(NdArray::zeros(&[], DType::F32), NdArray::Scalar(_)));
        assert!(matches!(NdArray::zeros(&[3], DType::F32), NdArray::Vector(_)));
        assert!(matches!(NdArray::zeros(&[3, 2], DType::F32), NdArray::Matrix(_)));
        assert!(matches!(NdArray::zeros(&[3, 2, 1], DType::F32), NdArray::Nd(_)));
    }

    #[test]
    fn test_same_contract_across_ranks() {
        let shapes: [&[usize]; 5] = [&[], &[6], &[2, 3], &[1, 2, 3], &[1, 1, 2, 3]];
        for shape in shapes {
            let array = NdArray::zeros(shape, DType::I32);
            let generic = array.as_tensor().clone();
            for flat in 0..array.size() {
                let locs = array.index_to_loc(flat);
                assert_eq!(array.loc_to_index(&locs), flat, "shape {shape:?}");
                assert_eq!(generic.loc_to_index(&locs), flat, "shape {shape:?}");
            }
        }
    }

    #[test]
    fn test_dispose_every_rank() {
        let shapes: [&[usize]; 4] = [&[], &[3], &[2, 2], &[2, 1, 2]];
        for shape in shapes {
            let mut array = NdArray::zeros(shape, DType::F32);
            let sibling = array.as_tensor().clone();
            array.dispose();

            assert!(array.is_disposed(), "shape {shape:?}");
            assert!(array.shape().is_empty());
            assert!(matches!(array.values(), Err(Error::Disposed)));
            assert!(matches!(
                array.get_at(&vec![0; shape.len()]),
                Err(Error::Disposed)
            ));
            // Other aliases keep the storage
            assert_eq!(sibling.alias_count(), 1);
            assert!(sibling.values().is_ok());
        }
    }

    #[test]
    fn test_new_matrix_scenario() {
        let data = TensorData::values(HostBuffer::F32(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
        let array = NdArray::new(&[2, 3], data, DType::F32).unwrap();
        assert_eq!(array.get_at(&[1, 2]).unwrap(), 6.0);
        array.set_at(9.0, &[0, 0]).unwrap();
        assert_eq!(array.get_at(&[0, 0]).unwrap(), 9.0);
    }
}
