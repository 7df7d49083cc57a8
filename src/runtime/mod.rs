//! Accelerator backends for tensor storage
//!
//! This module defines the `TextureManager` trait, the narrow contract a
//! tensor needs from an accelerator, and the explicit `Context` through
//! which tensors reach a manager.
//!
//! # Architecture
//!
//! ```text
//! Context (explicitly constructed, cloned into device-resident storage)
//! └── TextureManager (pools textures, copies data in and out)
//!     ├── texture_layout      (2D layout negotiation)
//!     ├── acquire / release   (pooling)
//!     ├── upload / download   (synchronous transfers)
//!     └── enqueue_checkpoint  (optional readiness fence)
//! ```
//!
//! Pool policy lives entirely inside the manager; tensors only acquire and
//! release whole textures.

mod checkpoint;
mod context;
#[cfg(feature = "host")]
pub mod host;
pub mod layout;
mod texture;

pub use checkpoint::{Checkpoint, CheckpointSignal, checkpoint};
pub use context::Context;
pub use layout::DEFAULT_MAX_TEXTURE_SIZE;
pub use texture::{DeviceTexture, TexLayout, TextureHandle};

use crate::dtype::{DType, HostBuffer};
use crate::error::Result;

/// Accelerator texture manager
///
/// Implementations own every texture they hand out and serialize access to
/// their pool; tensors never touch pool internals. Textures are identified
/// by opaque `TextureHandle`s and always travel together with the
/// `TexLayout` they were acquired for.
///
/// # Example
///
/// ```
/// # #[cfg(feature = "host")]
/// # fn main() -> ndtex::error::Result<()> {
/// use ndtex::runtime::{Context, host::HostTextureManager};
/// use ndtex::tensor::Tensor;
///
/// let ctx = Context::with_manager(HostTextureManager::default());
/// let tensor = Tensor::from_slice(&[1.0f32, 2.0, 3.0], &[3])?;
/// tensor.upload(&ctx)?;
/// assert!(tensor.is_uploaded());
/// # Ok(())
/// # }
/// # #[cfg(not(feature = "host"))]
/// # fn main() {}
/// ```
pub trait TextureManager: Send + Sync {
    /// Human-readable name of this manager
    fn name(&self) -> &'static str {
        "texture"
    }

    /// Largest row or column count a single texture may have
    fn max_texture_size(&self) -> usize {
        DEFAULT_MAX_TEXTURE_SIZE
    }

    /// Choose a 2D layout able to hold a tensor of `shape`
    ///
    /// The returned layout must satisfy `rows * cols >= size(shape)`. The
    /// default follows [`layout::texture_layout`].
    fn texture_layout(&self, shape: &[usize], preferred: Option<TexLayout>) -> Result<TexLayout> {
        layout::texture_layout(shape, preferred, self.max_texture_size())
    }

    /// Hand out a texture of the given layout
    ///
    /// Returns `Err(PoolExhausted)` if no texture can be provided.
    fn acquire_texture(&self, layout: TexLayout) -> Result<TextureHandle>;

    /// Return a texture to the pool
    ///
    /// Releasing the same handle twice is a caller bug.
    fn release_texture(&self, handle: TextureHandle, layout: TexLayout);

    /// Copy host values into a texture (blocking)
    fn upload(&self, handle: TextureHandle, layout: TexLayout, values: &HostBuffer) -> Result<()>;

    /// Copy the first `len` elements of a texture back to the host (blocking)
    ///
    /// Observes every write to the texture issued before the call.
    fn download(
        &self,
        handle: TextureHandle,
        layout: TexLayout,
        dtype: DType,
        len: usize,
    ) -> Result<HostBuffer>;

    /// Insert a no-op readiness checkpoint into the command stream
    ///
    /// Returns `None` when the backend has no fence capability, which forces
    /// callers onto the synchronous download path.
    fn enqueue_checkpoint(&self) -> Option<Checkpoint> {
        None
    }
}
