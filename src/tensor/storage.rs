//! Storage: host/accelerator residency with Arc-based sharing

use crate::dtype::{DType, HostBuffer};
use crate::error::Result;
use crate::runtime::{Context, DeviceTexture, TexLayout, TextureHandle};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Where a tensor's data currently lives
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Location {
    /// Materialized in host memory
    Host,
    /// Held in an accelerator texture
    Device,
}

/// The two forms tensor data can take. Exactly one is resident at a time;
/// migrating in either direction replaces (and frees) the other.
enum Residency {
    Host(HostBuffer),
    Device(DeviceTexture),
}

/// Storage for tensor data, shared between aliases
///
/// Storage wraps the resident form with reference counting, so reshape views
/// share one buffer without copying. A migration performed through any
/// alias is observed by all of them.
///
/// The data (host buffer or texture) is released when the last reference is
/// dropped; textures go back to their manager's pool at that point.
pub struct Storage {
    inner: Arc<Mutex<Residency>>,
}

impl Storage {
    /// Create host-resident storage
    pub fn from_host(values: HostBuffer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Residency::Host(values))),
        }
    }

    /// Create accelerator-resident storage owning `texture`
    pub fn from_device(texture: DeviceTexture) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Residency::Device(texture))),
        }
    }

    /// Where the data currently lives
    pub fn location(&self) -> Location {
        match &*self.inner.lock() {
            Residency::Host(_) => Location::Host,
            Residency::Device(_) => Location::Device,
        }
    }

    /// Layout of the resident texture, if the data is on the accelerator
    pub fn texture_layout(&self) -> Option<TexLayout> {
        match &*self.inner.lock() {
            Residency::Host(_) => None,
            Residency::Device(texture) => Some(texture.layout()),
        }
    }

    /// Context owning the resident texture, if the data is on the accelerator
    pub fn device_context(&self) -> Option<Context> {
        match &*self.inner.lock() {
            Residency::Host(_) => None,
            Residency::Device(texture) => Some(texture.context().clone()),
        }
    }

    /// Get the reference count
    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Check if this is the only reference
    #[inline]
    pub fn is_unique(&self) -> bool {
        Arc::strong_count(&self.inner) == 1
    }

    /// Check if two storages are the same allocation
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Move the data into a texture (no-op if already resident there)
    ///
    /// The manager negotiates a layout for `shape`, a texture is acquired
    /// and filled, and the host buffer is freed. Returns the texture handle
    /// and its layout.
    pub(crate) fn upload(
        &self,
        context: &Context,
        shape: &[usize],
        preferred: Option<TexLayout>,
    ) -> Result<(TextureHandle, TexLayout)> {
        let mut residency = self.inner.lock();
        let values = match &*residency {
            Residency::Device(texture) => return Ok((texture.handle(), texture.layout())),
            Residency::Host(values) => values,
        };

        let layout = context.manager()?.texture_layout(shape, preferred)?;
        // On a failed write the texture is dropped and goes straight back
        // to the pool; the host buffer stays resident.
        let texture = DeviceTexture::acquire(context, layout)?;
        texture.write(values)?;

        let handle = texture.handle();
        debug!(texture = %handle, %layout, len = values.len(), "uploaded");
        *residency = Residency::Device(texture);
        Ok((handle, layout))
    }

    /// Move the data back to host memory (no-op if already there)
    pub(crate) fn download(&self, dtype: DType, len: usize) -> Result<()> {
        let mut residency = self.inner.lock();
        ensure_host(&mut residency, dtype, len).map(|_| ())
    }

    /// Run `f` on the host buffer, downloading first if needed
    pub(crate) fn with_host<T>(
        &self,
        dtype: DType,
        len: usize,
        f: impl FnOnce(&mut HostBuffer) -> T,
    ) -> Result<T> {
        let mut residency = self.inner.lock();
        ensure_host(&mut residency, dtype, len).map(f)
    }
}

/// Download-on-demand transition: reads the texture into a fresh host
/// buffer, then replaces the residency, which releases the texture.
fn ensure_host(residency: &mut Residency, dtype: DType, len: usize) -> Result<&mut HostBuffer> {
    if let Residency::Device(texture) = &*residency {
        let values = texture.read(dtype, len)?;
        debug!(texture = %texture.handle(), layout = %texture.layout(), len, "downloaded");
        *residency = Residency::Host(values);
    }
    match residency {
        Residency::Host(values) => Ok(values),
        Residency::Device(_) => unreachable!("storage still device-resident after download"),
    }
}

impl Clone for Storage {
    /// Clone increments the reference count (zero-copy)
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let residency = self.inner.lock();
        let mut s = f.debug_struct("Storage");
        match &*residency {
            Residency::Host(values) => s
                .field("location", &Location::Host)
                .field("dtype", &values.dtype())
                .field("len", &values.len()),
            Residency::Device(texture) => s
                .field("location", &Location::Device)
                .field("texture", &texture.handle())
                .field("layout", &texture.layout()),
        };
        s.field("refs", &Arc::strong_count(&self.inner)).finish()
    }
}
