//! Gateway / search 指标收集模块
//!
//! 每个网关调用和每次搜索分发都通过这些函数记录指标。

use metrics::{counter, gauge, histogram};

/// 记录一次网关调用
///
/// `operation` 为静态操作名 (e.g. "get_heroes")，`success` 为 false 时表示已回退。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_gateway_call;
///
/// record_gateway_call("search_heroes", true, 12.5);
/// ```
pub fn record_gateway_call(operation: &'static str, success: bool, latency_ms: f64) {
    let status = if success { "success" } else { "fallback" };
    counter!(
        "heroes_gateway_calls_total",
        "operation" => operation,
        "status" => status
    )
    .increment(1);

    histogram!("heroes_gateway_latency_ms", "operation" => operation).record(latency_ms);
}

/// 记录空搜索词短路 (未调用 transport)
pub fn record_search_short_circuit() {
    counter!("heroes_gateway_search_short_circuit_total").increment(1);
}

/// 记录进入搜索管道的原始输入
pub fn record_search_term_received() {
    counter!("heroes_search_terms_received_total").increment(1);
}

/// 记录一次搜索分发
pub fn record_search_dispatch(generation: u64) {
    counter!("heroes_search_dispatches_total").increment(1);
    gauge!("heroes_search_generation").set(generation as f64);
}

/// 记录被新分发取代而丢弃的结果
pub fn record_search_superseded() {
    counter!("heroes_search_superseded_total").increment(1);
}

/// 记录交付给消费者的结果集
pub fn record_search_delivered(result_count: usize, latency_ms: f64) {
    counter!("heroes_search_delivered_total").increment(1);
    histogram!("heroes_search_result_count").record(result_count as f64);
    histogram!("heroes_search_dispatch_latency_ms").record(latency_ms);
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
