//! Indexing contract shared by the generic tensor and its rank-specialized views

use super::{Shape, Tensor};
use crate::error::Result;

/// Multi-index addressing over a tensor's flat storage
///
/// Every implementor answers the same contract; only the arithmetic differs
/// (direct offsets for scalars and vectors, a cached row stride for
/// matrices, the stride table otherwise). The provided element accessors
/// check that one index is given per dimension, then download the data if
/// it is on the accelerator.
pub trait Indexing {
    /// The tensor being indexed
    fn tensor(&self) -> &Tensor;

    /// Flat offset of a multi-index
    ///
    /// `locs` must hold one index per dimension.
    fn loc_to_index(&self, locs: &[usize]) -> usize;

    /// Multi-index of a flat offset, most-significant dimension first
    fn index_to_loc(&self, index: usize) -> Shape;

    /// Read the element at `locs`
    fn get_at(&self, locs: &[usize]) -> Result<f64> {
        let tensor = self.tensor();
        tensor.check_rank(locs)?;
        tensor.read_flat(self.loc_to_index(locs))
    }

    /// Overwrite the element at `locs`
    fn set_at(&self, value: f64, locs: &[usize]) -> Result<()> {
        let tensor = self.tensor();
        tensor.check_rank(locs)?;
        tensor.write_flat(self.loc_to_index(locs), value)
    }

    /// Add `delta` to the element at `locs`
    fn add_at(&self, delta: f64, locs: &[usize]) -> Result<()> {
        let tensor = self.tensor();
        tensor.check_rank(locs)?;
        tensor.add_flat(self.loc_to_index(locs), delta)
    }
}

impl Indexing for Tensor {
    fn tensor(&self) -> &Tensor {
        self
    }

    #[inline]
    fn loc_to_index(&self, locs: &[usize]) -> usize {
        Tensor::loc_to_index(self, locs)
    }

    fn index_to_loc(&self, index: usize) -> Shape {
        Tensor::index_to_loc(self, index)
    }
}
