//! Message sink implementations
//!
//! Contains MessageLog, TracingMessageSink, and FanoutSink.

mod fanout;
mod log;
mod memory;

pub use self::fanout::FanoutSink;
pub use self::log::TracingMessageSink;
pub use self::memory::MessageLog;
