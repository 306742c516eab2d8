//! FanoutSink - writes every message to several sinks

use contracts::{MessageSink, SharedMessageSink};

/// Sink that forwards each message to all inner sinks, in order
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<SharedMessageSink>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<SharedMessageSink>) -> Self {
        Self { sinks }
    }

    pub fn with(mut self, sink: SharedMessageSink) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl MessageSink for FanoutSink {
    fn add(&self, message: String) {
        if let Some((last, rest)) = self.sinks.split_last() {
            for sink in rest {
                sink.add(message.clone());
            }
            last.add(message);
        }
    }
}
