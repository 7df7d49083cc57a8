//! Texture handles and the accelerator form of tensor storage

use super::Context;
use crate::dtype::{DType, HostBuffer};
use crate::error::Result;
use std::fmt;
use tracing::{debug, warn};

/// Opaque identifier of a texture owned by a `TextureManager`
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(u64);

impl TextureHandle {
    /// Create from a raw value assigned by a manager
    #[inline]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TextureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Texture({})", self.0)
    }
}

/// Logical 2D layout of a texture: rows by columns
///
/// Need not match the tensor's own shape; only `capacity() >= size` is
/// required.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TexLayout {
    /// Number of rows
    pub rows: usize,
    /// Number of columns
    pub cols: usize,
}

impl TexLayout {
    /// Create a layout
    #[inline]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Number of elements the layout can hold
    #[inline]
    pub const fn capacity(self) -> usize {
        self.rows * self.cols
    }
}

impl From<(usize, usize)> for TexLayout {
    fn from((rows, cols): (usize, usize)) -> Self {
        Self { rows, cols }
    }
}

impl fmt::Display for TexLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.rows, self.cols)
    }
}

/// Accelerator-resident storage: a texture plus its layout
///
/// Owns the texture: dropping a `DeviceTexture` returns it to the manager of
/// its context, exactly once.
pub struct DeviceTexture {
    handle: TextureHandle,
    layout: TexLayout,
    context: Context,
}

impl DeviceTexture {
    /// Acquire a fresh texture of `layout` from the context's manager
    pub(crate) fn acquire(context: &Context, layout: TexLayout) -> Result<Self> {
        let manager = context.manager()?;
        let handle = manager.acquire_texture(layout)?;
        Ok(Self {
            handle,
            layout,
            context: context.clone(),
        })
    }

    /// Take ownership of a texture previously acquired from `context`
    pub fn adopt(context: &Context, handle: TextureHandle, layout: TexLayout) -> Self {
        Self {
            handle,
            layout,
            context: context.clone(),
        }
    }

    /// Get the texture handle
    #[inline]
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    /// Get the 2D layout negotiated for this texture
    #[inline]
    pub fn layout(&self) -> TexLayout {
        self.layout
    }

    /// Get the context that owns the texture
    #[inline]
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub(crate) fn write(&self, values: &HostBuffer) -> Result<()> {
        self.context
            .manager()?
            .upload(self.handle, self.layout, values)
    }

    pub(crate) fn read(&self, dtype: DType, len: usize) -> Result<HostBuffer> {
        self.context
            .manager()?
            .download(self.handle, self.layout, dtype, len)
    }
}

impl Drop for DeviceTexture {
    fn drop(&mut self) {
        match self.context.manager() {
            Ok(manager) => {
                debug!(texture = %self.handle, layout = %self.layout, "releasing texture");
                manager.release_texture(self.handle, self.layout);
            }
            Err(_) => {
                warn!(
                    texture = %self.handle,
                    layout = %self.layout,
                    "context shut down before texture release; texture leaked"
                );
            }
        }
    }
}

impl fmt::Debug for DeviceTexture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceTexture")
            .field("handle", &self.handle)
            .field("layout", &self.layout)
            .finish()
    }
}
