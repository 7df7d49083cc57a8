//! Common test utilities
#![allow(dead_code)]

use ndtex::dtype::{DType, HostBuffer};
use ndtex::error::{Error, Result};
use ndtex::runtime::{
    Checkpoint, CheckpointSignal, Context, TexLayout, TextureHandle, TextureManager, checkpoint,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// A call made to the mock manager
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Acquire(TextureHandle, TexLayout),
    Release(TextureHandle, TexLayout),
    Upload(TextureHandle),
    Download(TextureHandle),
}

/// How the mock answers `enqueue_checkpoint`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckpointMode {
    /// No checkpoint capability
    Unsupported,
    /// Checkpoints complete immediately
    Immediate,
    /// Checkpoints stay pending until `complete_checkpoints` is called
    Held,
}

/// Texture manager that records every call, without any pooling
pub struct MockManager {
    layout: Option<TexLayout>,
    capacity: Option<usize>,
    mode: CheckpointMode,
    fail_uploads: bool,
    textures: Mutex<HashMap<TextureHandle, Vec<u8>>>,
    next_id: Mutex<u64>,
    calls: Mutex<Vec<Call>>,
    pending: Mutex<Vec<CheckpointSignal>>,
}

impl MockManager {
    pub fn new() -> Self {
        Self {
            layout: None,
            capacity: None,
            mode: CheckpointMode::Unsupported,
            fail_uploads: false,
            textures: Mutex::new(HashMap::new()),
            next_id: Mutex::new(0),
            calls: Mutex::new(Vec::new()),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Always negotiate `layout`, whatever the shape
    pub fn with_layout(mut self, layout: TexLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Fail acquisitions once `capacity` textures are live
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Reject every host-to-texture copy with a backend error
    pub fn with_failing_uploads(mut self) -> Self {
        self.fail_uploads = true;
        self
    }

    pub fn with_checkpoints(mut self, mode: CheckpointMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn acquired(&self) -> Vec<(TextureHandle, TexLayout)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::Acquire(h, l) => Some((*h, *l)),
                _ => None,
            })
            .collect()
    }

    pub fn released(&self) -> Vec<(TextureHandle, TexLayout)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::Release(h, l) => Some((*h, *l)),
                _ => None,
            })
            .collect()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.lock().len()
    }

    pub fn pending_checkpoints(&self) -> usize {
        self.pending.lock().len()
    }

    /// Signal every held checkpoint
    pub fn complete_checkpoints(&self) {
        for signal in self.pending.lock().drain(..) {
            signal.complete();
        }
    }
}

impl TextureManager for MockManager {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn texture_layout(&self, shape: &[usize], preferred: Option<TexLayout>) -> Result<TexLayout> {
        match self.layout {
            Some(layout) => Ok(layout),
            None => ndtex::runtime::layout::texture_layout(shape, preferred, self.max_texture_size()),
        }
    }

    fn acquire_texture(&self, layout: TexLayout) -> Result<TextureHandle> {
        let mut textures = self.textures.lock();
        if self.capacity.is_some_and(|cap| textures.len() >= cap) {
            return Err(Error::PoolExhausted { layout });
        }
        let mut next_id = self.next_id.lock();
        *next_id += 1;
        let handle = TextureHandle::from_raw(*next_id);
        textures.insert(handle, vec![0u8; layout.capacity() * 4]);
        self.calls.lock().push(Call::Acquire(handle, layout));
        Ok(handle)
    }

    fn release_texture(&self, handle: TextureHandle, layout: TexLayout) {
        self.textures.lock().remove(&handle);
        self.calls.lock().push(Call::Release(handle, layout));
    }

    fn upload(&self, handle: TextureHandle, _layout: TexLayout, values: &HostBuffer) -> Result<()> {
        if self.fail_uploads {
            return Err(Error::Backend(format!("copy into {handle} failed")));
        }
        let mut textures = self.textures.lock();
        let texels = textures
            .get_mut(&handle)
            .ok_or_else(|| Error::Backend(format!("unknown {handle}")))?;
        let bytes = values.as_bytes();
        texels[..bytes.len()].copy_from_slice(bytes);
        self.calls.lock().push(Call::Upload(handle));
        Ok(())
    }

    fn download(
        &self,
        handle: TextureHandle,
        _layout: TexLayout,
        dtype: DType,
        len: usize,
    ) -> Result<HostBuffer> {
        let textures = self.textures.lock();
        let texels = textures
            .get(&handle)
            .ok_or_else(|| Error::Backend(format!("unknown {handle}")))?;
        self.calls.lock().push(Call::Download(handle));
        HostBuffer::from_bytes(dtype, len, texels)
    }

    fn enqueue_checkpoint(&self) -> Option<Checkpoint> {
        match self.mode {
            CheckpointMode::Unsupported => None,
            CheckpointMode::Immediate => Some(Checkpoint::ready()),
            CheckpointMode::Held => {
                let (signal, checkpoint) = checkpoint();
                self.pending.lock().push(signal);
                Some(checkpoint)
            }
        }
    }
}

/// Create a context bound to a fresh mock, keeping a handle for inspection
pub fn mock_context(manager: MockManager) -> (Context, Arc<MockManager>) {
    let manager = Arc::new(manager);
    (Context::from_arc(manager.clone()), manager)
}
