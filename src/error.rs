//! Error types for ndtex

use crate::dtype::DType;
use crate::runtime::TexLayout;
use thiserror::Error;

/// Result type alias using ndtex's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ndtex operations
#[derive(Error, Debug)]
pub enum Error {
    /// Host values do not match the declared shape
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape (or value count)
        got: Vec<usize>,
    },

    /// Storage description is missing one of its required parts
    #[error("Incomplete storage: {reason}")]
    IncompleteStorage {
        /// What is missing
        reason: &'static str,
    },

    /// Reshape target cannot describe the tensor
    #[error("Invalid shape {shape:?} for tensor of size {size}: {reason}")]
    InvalidShape {
        /// Requested shape (`-1` marks an inferred dimension)
        shape: Vec<isize>,
        /// Element count of the source tensor
        size: usize,
        /// Reason for invalidity
        reason: &'static str,
    },

    /// Wrong number of dimensions for a rank-specialized view or index
    #[error("Invalid rank: expected {expected}, got {got}")]
    InvalidRank {
        /// Expected rank
        expected: usize,
        /// Actual rank
        got: usize,
    },

    /// DType mismatch between a tensor and the values supplied or requested
    #[error("DType mismatch: {lhs} vs {rhs}")]
    DTypeMismatch {
        /// Tensor dtype
        lhs: DType,
        /// Supplied or requested dtype
        rhs: DType,
    },

    /// Flat index outside the host buffer
    #[error("Index {index} out of bounds for tensor of size {size}")]
    IndexOutOfBounds {
        /// The computed flat index
        index: usize,
        /// Number of elements
        size: usize,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Accelerator operation attempted without an initialized context
    #[error("Accelerator backend is not initialized")]
    UninitializedBackend,

    /// Texture manager could not provide storage
    #[error("Texture pool exhausted: cannot acquire texture of layout {layout}")]
    PoolExhausted {
        /// Requested layout
        layout: TexLayout,
    },

    /// No texture layout under the maximum texture size can hold the tensor
    #[error("Tensor of shape {shape:?} does not fit in a texture (max dimension {max})")]
    TextureTooLarge {
        /// Logical shape of the tensor
        shape: Vec<usize>,
        /// Maximum texture dimension of the manager
        max: usize,
    },

    /// Tensor was disposed and can no longer be used
    #[error("Tensor has been disposed")]
    Disposed,

    /// Backend-specific error
    #[error("Backend error: {0}")]
    Backend(String),
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create an invalid shape error
    pub fn invalid_shape(shape: &[isize], size: usize, reason: &'static str) -> Self {
        Self::InvalidShape {
            shape: shape.to_vec(),
            size,
            reason,
        }
    }

    /// Create an invalid rank error
    pub fn invalid_rank(expected: usize, got: usize) -> Self {
        Self::InvalidRank { expected, got }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create a dtype mismatch error
    pub fn dtype_mismatch(lhs: DType, rhs: DType) -> Self {
        Self::DTypeMismatch { lhs, rhs }
    }
}
