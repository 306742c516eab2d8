//! HeroesConfig - Config Loader output
//!
//! Describes where the collection lives, how the gateway reports, and how the
//! search pipeline paces dispatches.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete workspace configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct HeroesConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Collection endpoint
    #[serde(default)]
    #[validate(nested)]
    pub transport: TransportConfig,

    /// Gateway logging and failure reporting
    #[serde(default)]
    #[validate(nested)]
    pub gateway: GatewayConfig,

    /// Type-ahead search pacing
    #[serde(default)]
    #[validate(nested)]
    pub search: SearchConfig,
}

/// Collection endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TransportConfig {
    /// Base URL, e.g. "http://localhost:3000/api"
    #[serde(default = "default_base_url")]
    #[validate(url)]
    pub base_url: String,

    /// Collection name appended to the base URL
    #[serde(default = "default_collection")]
    #[validate(length(min = 1))]
    pub collection: String,

    /// TCP connect timeout (milliseconds)
    #[serde(default = "default_connect_timeout_ms")]
    #[validate(range(min = 1))]
    pub connect_timeout_ms: u64,

    /// Whole-request timeout (milliseconds)
    #[serde(default = "default_request_timeout_ms")]
    #[validate(range(min = 1))]
    pub request_timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_collection() -> String {
    "heroes".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    2_000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            collection: default_collection(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl TransportConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Gateway reporting settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GatewayConfig {
    /// Prefix written before every message log entry
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,

    /// Buffered failure notifications per subscriber
    #[serde(default = "default_failure_capacity")]
    #[validate(range(min = 1))]
    pub failure_channel_capacity: usize,
}

fn default_log_prefix() -> String {
    "HeroService: ".to_string()
}

fn default_failure_capacity() -> usize {
    64
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            log_prefix: default_log_prefix(),
            failure_channel_capacity: default_failure_capacity(),
        }
    }
}

/// When an in-flight search dispatch stops being current
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupersedePolicy {
    /// Any new raw term invalidates the in-flight dispatch
    #[default]
    OnInput,
    /// Only the next dispatch invalidates the in-flight one
    OnDispatch,
}

/// Search pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchConfig {
    /// Quiet interval before a term is dispatched (milliseconds)
    #[serde(default = "default_debounce_ms")]
    #[validate(range(min = 1))]
    pub debounce_ms: u64,

    /// Supersede rule for in-flight dispatches
    #[serde(default)]
    pub supersede: SupersedePolicy,

    /// Result sets buffered for the consumer
    #[serde(default = "default_output_capacity")]
    #[validate(range(min = 1))]
    pub output_capacity: usize,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_output_capacity() -> usize {
    16
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            supersede: SupersedePolicy::default(),
            output_capacity: default_output_capacity(),
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        // Whole milliseconds, never below the 1 ms floor
        self.debounce_ms = u64::try_from(debounce.as_millis()).unwrap_or(u64::MAX).max(1);
        self
    }

    pub fn with_supersede(mut self, supersede: SupersedePolicy) -> Self {
        self.supersede = supersede;
        self
    }
}
