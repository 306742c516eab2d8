//! MessageLog - in-memory, order-preserving message list

use std::sync::{Mutex, MutexGuard};

use contracts::MessageSink;

/// Append-only list of messages, readable at any time.
///
/// Backs the message panel: everything the gateway reports lands here in the
/// order it was written.
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Mutex<Vec<String>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all messages, oldest first
    pub fn messages(&self) -> Vec<String> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Messages containing `needle`
    pub fn matching(&self, needle: &str) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|message| message.contains(needle))
            .cloned()
            .collect()
    }

    /// Drop every message
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Remove and return every message
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MessageSink for MessageLog {
    fn add(&self, message: String) {
        self.lock().push(message);
    }
}
