//! The shared model handle.
//!
//! Written once during startup, read by every `/ask` request. Readiness is an
//! explicit tri-state rather than a nullable reference, so a handler can tell
//! "not initialized yet" apart from "initialization failed".

use super::providers::TextProvider;
use std::fmt;
use std::sync::{Arc, OnceLock};

enum Slot {
    Ready(Arc<dyn TextProvider>),
    Failed(String),
}

/// Snapshot of the handle's readiness.
#[derive(Clone)]
pub enum ModelState {
    Uninitialized,
    Ready(Arc<dyn TextProvider>),
    Failed(String),
}

impl ModelState {
    pub fn label(&self) -> &'static str {
        match self {
            ModelState::Uninitialized => "uninitialized",
            ModelState::Ready(_) => "ready",
            ModelState::Failed(_) => "failed",
        }
    }
}

impl fmt::Debug for ModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelState::Uninitialized => f.write_str("Uninitialized"),
            ModelState::Ready(provider) => f.debug_tuple("Ready").field(&provider.model()).finish(),
            ModelState::Failed(reason) => f.debug_tuple("Failed").field(reason).finish(),
        }
    }
}

/// Cheaply cloneable handle to the generative client. Set at most once.
#[derive(Clone, Default)]
pub struct ModelHandle {
    slot: Arc<OnceLock<Slot>>,
}

impl ModelHandle {
    /// A handle that has not been initialized yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle that is already ready.
    pub fn ready(provider: Arc<dyn TextProvider>) -> Self {
        let handle = Self::new();
        handle.set_ready(provider);
        handle
    }

    /// Returns `false` if the handle was already set.
    pub fn set_ready(&self, provider: Arc<dyn TextProvider>) -> bool {
        self.slot.set(Slot::Ready(provider)).is_ok()
    }

    /// Returns `false` if the handle was already set.
    pub fn set_failed(&self, reason: impl Into<String>) -> bool {
        self.slot.set(Slot::Failed(reason.into())).is_ok()
    }

    pub fn state(&self) -> ModelState {
        match self.slot.get() {
            None => ModelState::Uninitialized,
            Some(Slot::Ready(provider)) => ModelState::Ready(Arc::clone(provider)),
            Some(Slot::Failed(reason)) => ModelState::Failed(reason.clone()),
        }
    }

    /// The provider, only when the handle is ready.
    pub fn provider(&self) -> Option<Arc<dyn TextProvider>> {
        match self.slot.get() {
            Some(Slot::Ready(provider)) => Some(Arc::clone(provider)),
            _ => None,
        }
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("state", &self.state())
            .finish()
    }
}
