//! # Gateway
//!
//! 数据访问网关。
//!
//! 负责：
//! - 包装所有 transport 操作
//! - 每次调用写入一条消息日志
//! - 失败时回退到预定义值，从不向调用方返回错误
//! - 通过广播通道发布失败事件

pub mod failure;
pub mod gateway;
pub mod metrics;
pub mod sinks;

pub use contracts::{HeroSearch, HeroTransport, MessageSink, SharedMessageSink};
pub use failure::{GatewayFailure, GatewayOp};
pub use gateway::HeroGateway;
pub use metrics::{GatewayMetrics, MetricsSnapshot};
pub use sinks::{FanoutSink, MessageLog, TracingMessageSink};
