//! Explicit accelerator context

use super::TextureManager;
use crate::error::{Error, Result};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Handle to an accelerator texture manager
///
/// A context starts uninitialized (`Context::new`) or with a manager
/// (`Context::with_manager`). Clones share the same slot, so initializing
/// or shutting down one clone affects all of them. Every accelerator-
/// dependent operation reached through an uninitialized context fails with
/// `Error::UninitializedBackend`.
///
/// Separate contexts are fully isolated, which lets tests run several mock
/// managers side by side.
#[derive(Clone, Default)]
pub struct Context {
    slot: Arc<RwLock<Option<Arc<dyn TextureManager>>>>,
}

impl Context {
    /// Create an uninitialized context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context bound to `manager`
    pub fn with_manager<M: TextureManager + 'static>(manager: M) -> Self {
        Self::from_arc(Arc::new(manager))
    }

    /// Create a context bound to a shared manager
    pub fn from_arc(manager: Arc<dyn TextureManager>) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(manager))),
        }
    }

    /// Install `manager`, replacing any previous one
    pub fn init(&self, manager: Arc<dyn TextureManager>) {
        *self.slot.write() = Some(manager);
    }

    /// Remove the manager, returning it
    ///
    /// Textures still owned by tensors can no longer be released or read
    /// after shutdown.
    pub fn shutdown(&self) -> Option<Arc<dyn TextureManager>> {
        self.slot.write().take()
    }

    /// Whether a manager is installed
    pub fn is_initialized(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Get the installed manager
    pub fn manager(&self) -> Result<Arc<dyn TextureManager>> {
        self.slot.read().clone().ok_or(Error::UninitializedBackend)
    }

    /// Check if two contexts share the same slot
    pub fn is_same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.read();
        f.debug_struct("Context")
            .field("manager", &slot.as_ref().map(|m| m.name()))
            .finish()
    }
}
