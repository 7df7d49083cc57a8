//! Strides type: row-major element offsets for multi-index addressing

use super::shape::STACK_DIMS;
use smallvec::SmallVec;
use std::fmt;
use std::ops::Deref;

/// Row-major strides of every dimension except the last
///
/// `strides[i]` is the product of `shape[i + 1..]`. The last dimension has
/// an implicit stride of 1 and is never stored, so a rank-`r` tensor has
/// `max(r - 1, 0)` entries. Strides are in ELEMENTS, not bytes.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Strides(SmallVec<[usize; STACK_DIMS]>);

impl Strides {
    /// Compute the stride table for `shape`
    ///
    /// # Example
    /// ```
    /// use ndtex::tensor::Strides;
    /// assert_eq!(Strides::row_major(&[2, 3, 4]).as_slice(), &[12, 4]);
    /// assert!(Strides::row_major(&[5]).is_empty());
    /// ```
    pub fn row_major(shape: &[usize]) -> Self {
        let rank = shape.len();
        if rank < 2 {
            return Self(SmallVec::new());
        }

        let mut strides: SmallVec<[usize; STACK_DIMS]> = SmallVec::from_elem(0, rank - 1);
        strides[rank - 2] = shape[rank - 1];
        for i in (0..rank - 2).rev() {
            // Saturates only for empty tensors, which have no valid offsets.
            strides[i] = strides[i + 1].saturating_mul(shape[i + 1]);
        }
        Self(strides)
    }

    /// View strides as a slice.
    pub fn as_slice(&self) -> &[usize] {
        self.0.as_slice()
    }

    /// Number of stride entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this stride table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flat offset of a multi-index
    ///
    /// `locs` must have one entry per dimension (one more than the table).
    #[inline]
    pub fn offset(&self, locs: &[usize]) -> usize {
        match locs.split_last() {
            None => 0,
            Some((&last, leading)) => leading
                .iter()
                .zip(self.0.iter())
                .fold(last, |acc, (&loc, &stride)| acc + loc * stride),
        }
    }

    /// Multi-index of a flat offset, most-significant dimension first
    ///
    /// `rank` is the rank of the tensor the table belongs to.
    pub fn unravel(&self, mut index: usize, rank: usize) -> SmallVec<[usize; STACK_DIMS]> {
        let mut locs = SmallVec::with_capacity(rank);
        if rank == 0 {
            return locs;
        }
        for &stride in self.0.iter() {
            // A zero stride only occurs for empty tensors, which have no
            // valid offsets.
            if stride == 0 {
                locs.push(0);
                continue;
            }
            locs.push(index / stride);
            index %= stride;
        }
        locs.push(index);
        locs
    }
}

impl Deref for Strides {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        self.0.as_slice()
    }
}

impl fmt::Debug for Strides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<[usize]> for Strides {
    fn as_ref(&self) -> &[usize] {
        self.0.as_slice()
    }
}
