//! Host-memory texture manager
//!
//! A reference `TextureManager` that emulates textures with host byte
//! buffers. It pools released textures in free lists keyed by layout, the
//! way a real accelerator pool avoids reallocating storage for repeated
//! shapes, and serves as the default backend for tests and CPU-only builds.

use super::{Checkpoint, DEFAULT_MAX_TEXTURE_SIZE, TexLayout, TextureHandle, TextureManager};
use crate::dtype::{DType, HostBuffer};
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{trace, warn};

/// Bytes per emulated texel (one 32-bit channel)
const TEXEL_BYTES: usize = 4;

/// Configuration for [`HostTextureManager`]
#[derive(Clone, Debug)]
pub struct HostPoolConfig {
    /// Largest row or column count of a texture
    pub max_texture_size: usize,
    /// Cap on live textures (in use plus pooled); `None` is unbounded
    pub max_textures: Option<usize>,
    /// Whether readiness checkpoints are offered
    pub checkpoints: bool,
}

impl Default for HostPoolConfig {
    fn default() -> Self {
        Self {
            max_texture_size: DEFAULT_MAX_TEXTURE_SIZE,
            max_textures: None,
            checkpoints: true,
        }
    }
}

impl HostPoolConfig {
    /// Set the maximum texture dimension
    pub fn with_max_texture_size(mut self, max_texture_size: usize) -> Self {
        self.max_texture_size = max_texture_size;
        self
    }

    /// Cap the number of live textures
    pub fn with_max_textures(mut self, max_textures: usize) -> Self {
        self.max_textures = Some(max_textures);
        self
    }

    /// Enable or disable readiness checkpoints
    pub fn with_checkpoints(mut self, checkpoints: bool) -> Self {
        self.checkpoints = checkpoints;
        self
    }
}

struct HostTexture {
    layout: TexLayout,
    texels: Vec<u8>,
    in_use: bool,
}

#[derive(Default)]
struct PoolState {
    textures: HashMap<TextureHandle, HostTexture>,
    free: HashMap<TexLayout, Vec<TextureHandle>>,
    next_id: u64,
}

/// Texture manager backed by host memory
#[derive(Default)]
pub struct HostTextureManager {
    config: HostPoolConfig,
    state: Mutex<PoolState>,
}

impl HostTextureManager {
    /// Create a manager with the given configuration
    pub fn new(config: HostPoolConfig) -> Self {
        Self {
            config,
            state: Mutex::new(PoolState::default()),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &HostPoolConfig {
        &self.config
    }

    /// Number of textures currently handed out
    pub fn num_used_textures(&self) -> usize {
        self.state
            .lock()
            .textures
            .values()
            .filter(|t| t.in_use)
            .count()
    }

    /// Number of released textures waiting in the pool
    pub fn num_free_textures(&self) -> usize {
        self.state.lock().free.values().map(Vec::len).sum()
    }

    /// Drop every pooled (released) texture
    pub fn clear_free(&self) {
        let mut state = self.state.lock();
        let PoolState { textures, free, .. } = &mut *state;
        for handle in free.drain().flat_map(|(_, handles)| handles) {
            textures.remove(&handle);
        }
    }
}

impl TextureManager for HostTextureManager {
    fn name(&self) -> &'static str {
        "host"
    }

    fn max_texture_size(&self) -> usize {
        self.config.max_texture_size
    }

    fn acquire_texture(&self, layout: TexLayout) -> Result<TextureHandle> {
        let mut state = self.state.lock();

        if let Some(handle) = state.free.get_mut(&layout).and_then(Vec::pop) {
            trace!(texture = %handle, %layout, "pool hit");
            if let Some(texture) = state.textures.get_mut(&handle) {
                texture.in_use = true;
                return Ok(handle);
            }
        }

        if let Some(max) = self.config.max_textures {
            if state.textures.len() >= max {
                return Err(Error::PoolExhausted { layout });
            }
        }

        state.next_id += 1;
        let handle = TextureHandle::from_raw(state.next_id);
        trace!(texture = %handle, %layout, "pool miss, allocating");
        state.textures.insert(
            handle,
            HostTexture {
                layout,
                texels: vec![0u8; layout.capacity() * TEXEL_BYTES],
                in_use: true,
            },
        );
        Ok(handle)
    }

    fn release_texture(&self, handle: TextureHandle, layout: TexLayout) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        match state.textures.get_mut(&handle) {
            Some(texture) if texture.in_use && texture.layout == layout => {
                texture.in_use = false;
                state.free.entry(layout).or_default().push(handle);
            }
            _ => warn!(texture = %handle, %layout, "release of unknown or idle texture ignored"),
        }
    }

    fn upload(&self, handle: TextureHandle, layout: TexLayout, values: &HostBuffer) -> Result<()> {
        let mut state = self.state.lock();
        let texture = live_texture(&mut state, handle, layout)?;
        let bytes = values.as_bytes();
        if bytes.len() > texture.texels.len() {
            return Err(Error::Backend(format!(
                "{} bytes do not fit in texture {handle} of layout {layout}",
                bytes.len()
            )));
        }
        texture.texels[..bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    fn download(
        &self,
        handle: TextureHandle,
        layout: TexLayout,
        dtype: DType,
        len: usize,
    ) -> Result<HostBuffer> {
        let mut state = self.state.lock();
        let texture = live_texture(&mut state, handle, layout)?;
        HostBuffer::from_bytes(dtype, len, &texture.texels)
    }

    fn enqueue_checkpoint(&self) -> Option<Checkpoint> {
        // Host copies complete before returning, so every checkpoint is
        // already passed when it is enqueued.
        self.config.checkpoints.then(Checkpoint::ready)
    }
}

fn live_texture(
    state: &mut PoolState,
    handle: TextureHandle,
    layout: TexLayout,
) -> Result<&mut HostTexture> {
    match state.textures.get_mut(&handle) {
        Some(texture) if texture.in_use && texture.layout == layout => Ok(texture),
        _ => Err(Error::Backend(format!(
            "texture {handle} with layout {layout} is not live"
        ))),
    }
}
