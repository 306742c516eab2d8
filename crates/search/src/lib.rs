//! # Search
//!
//! 类型提示搜索管道（debounce → distinct → switch-dispatch）。
//!
//! 负责：
//! - 在输入静默期结束前压住新词，只保留最后一个
//! - 丢弃与上一次相同的词
//! - 为每次分发分配递增代号，只交付当前代号的结果
//!
//! ## 使用示例
//!
//! ```ignore
//! use search::SearchPipeline;
//!
//! let mut handle = SearchPipeline::spawn(Arc::new(gateway), SearchConfig::default());
//! handle.search("ma");
//! handle.search("mag");
//! while let Some(results) = handle.next().await {
//!     println!("{} -> {} heroes", results.term, results.heroes.len());
//! }
//! ```

mod pipeline;
mod stages;
mod stats;

// Re-exports
pub use contracts::{HeroSearch, SearchConfig, SearchResults, SupersedePolicy};
pub use pipeline::{SearchHandle, SearchInput, SearchPipeline};
pub use stages::{Debouncer, Dispatch, DistinctUntilChanged, SwitchGate};
pub use stats::PipelineStats;
