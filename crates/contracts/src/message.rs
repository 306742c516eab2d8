//! MessageSink trait - human-readable operation log
//!
//! The gateway writes one entry per completed or failed operation. The sink is
//! injected, so tests and the CLI can each choose where entries go.

use std::sync::Arc;

/// Shared handle to a message sink
pub type SharedMessageSink = Arc<dyn MessageSink>;

/// Append-only log of human-readable messages.
///
/// # Contract
///
/// `add` must not block the caller and must not fail observably. Entries
/// written from concurrent operations are kept in the order `add` is called.
pub trait MessageSink: Send + Sync {
    /// Append one message
    fn add(&self, message: String);
}

