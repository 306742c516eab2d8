//! TracingMessageSink - forwards log entries to tracing

use contracts::MessageSink;
use tracing::info;

/// Sink that emits every message as a tracing event
pub struct TracingMessageSink {
    name: String,
}

impl TracingMessageSink {
    /// Create a new TracingMessageSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl MessageSink for TracingMessageSink {
    fn add(&self, message: String) {
        info!(sink = %self.name, message = %message, "message logged");
    }
}
