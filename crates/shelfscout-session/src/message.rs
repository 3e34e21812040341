use std::sync::Arc;

use tokio::sync::Mutex;

/// The single transient, user-visible status message.
///
/// Cloning shares the slot, so concurrent enrichment tasks and the session
/// write to the same place. A newer message always replaces an older one.
#[derive(Debug, Clone, Default)]
pub struct MessageSlot {
    inner: Arc<Mutex<Option<String>>>,
}

impl MessageSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, message: impl Into<String>) {
        *self.inner.lock().await = Some(message.into());
    }

    pub async fn clear(&self) {
        *self.inner.lock().await = None;
    }

    pub async fn current(&self) -> Option<String> {
        self.inner.lock().await.clone()
    }

    /// Returns the message and empties the slot.
    pub async fn take(&self) -> Option<String> {
        self.inner.lock().await.take()
    }
}
