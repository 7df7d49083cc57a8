//! # ndtex
//!
//! **N-dimensional arrays that migrate between host memory and accelerator textures.**
//!
//! A [`Tensor`](tensor::Tensor) holds its data in exactly one place at a
//! time: a typed host buffer, or a 2D texture owned by a
//! [`TextureManager`](runtime::TextureManager). Reading values downloads them
//! on demand; uploading is explicit. Textures are pooled by the manager and
//! returned to it when the last tensor referring to them goes away.
//!
//! ## Features
//!
//! - **Tensors**: shape/stride bookkeeping, multi-index access, zero-copy reshape
//! - **Rank-specialized views**: scalar, vector, and matrix fast paths
//! - **Lazy migration**: synchronous and checkpoint-driven async downloads
//! - **Explicit context**: no process-wide accelerator state
//! - **Dtypes**: f32, i32, bool
//!
//! ## Quick Start
//!
//! ```rust
//! # #[cfg(feature = "host")]
//! # fn main() -> ndtex::error::Result<()> {
//! use ndtex::prelude::*;
//! use ndtex::runtime::host::HostTextureManager;
//!
//! let ctx = Context::with_manager(HostTextureManager::default());
//!
//! let t = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3])?;
//! t.upload(&ctx)?;
//! assert!(t.is_uploaded());
//!
//! // Reading downloads the data again
//! assert_eq!(t.get(&[1, 2])?, 6.0);
//! assert!(!t.is_uploaded());
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "host"))]
//! # fn main() {}
//! ```
//!
//! ## Feature Flags
//!
//! - `host` (default): reference texture manager backed by host memory

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dtype;
pub mod error;
pub mod runtime;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dtype::{DType, Element, HostBuffer};
    pub use crate::error::{Error, Result};
    pub use crate::runtime::{Context, TexLayout, TextureHandle, TextureManager};
    pub use crate::tensor::{Indexing, Matrix, NdArray, Scalar, Tensor, TensorData, Vector};
}
