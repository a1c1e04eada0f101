//! Process-wide runtime access switch (the kill switch).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared "runtime access enabled" flag.
///
/// Clones share one `AtomicBool`, so every gate built from the same switch
/// observes the same value. Reading is public; writing goes through
/// [`crate::AccessGate::set_access`], which checks the operator credential.
#[derive(Debug, Clone)]
pub struct AccessSwitch {
    enabled: Arc<AtomicBool>,
}

impl AccessSwitch {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub(crate) fn set(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }
}
