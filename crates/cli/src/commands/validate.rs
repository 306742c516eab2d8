//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use config_loader::HeroesConfig;

use crate::cli::{Cli, ValidateArgs};

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    collection_url: String,
    request_timeout_ms: u64,
    log_prefix: String,
    debounce_ms: u64,
    supersede: String,
}

/// Execute the `validate` command
pub fn run_validate(cli: &Cli, args: &ValidateArgs) -> Result<()> {
    info!(config = ?cli.config, "Validating configuration");

    let result = validate_config(cli);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(cli: &Cli) -> ValidationResult {
    let config_path = cli
        .config
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "(defaults)".to_string());

    match super::load_config(cli) {
        Ok(config) => {
            let warnings = collect_warnings(&config, cli.in_memory);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(summarize(&config)),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

fn summarize(config: &HeroesConfig) -> ConfigSummary {
    ConfigSummary {
        version: format!("{:?}", config.version),
        collection_url: format!(
            "{}/{}",
            config.transport.base_url.trim_end_matches('/'),
            config.transport.collection
        ),
        request_timeout_ms: config.transport.request_timeout_ms,
        log_prefix: config.gateway.log_prefix.clone(),
        debounce_ms: config.search.debounce_ms,
        supersede: format!("{:?}", config.search.supersede),
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &HeroesConfig, in_memory: bool) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.search.debounce_ms < 50 {
        warnings.push(format!(
            "search.debounce_ms = {} dispatches on almost every keystroke",
            config.search.debounce_ms
        ));
    }

    if config.gateway.log_prefix.is_empty() {
        warnings.push("gateway.log_prefix is empty - message log entries have no source".to_string());
    }

    let base_url = &config.transport.base_url;
    let local = ["localhost", "127.0.0.1", "[::1]"]
        .iter()
        .any(|host| base_url.contains(host));
    if !in_memory && base_url.starts_with("http://") && !local {
        warnings.push(format!("transport.base_url uses plain HTTP to a remote host: {base_url}"));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Collection: {}", summary.collection_url);
            println!("  Request timeout: {} ms", summary.request_timeout_ms);
            println!("  Log prefix: {:?}", summary.log_prefix);
            println!("  Debounce: {} ms", summary.debounce_ms);
            println!("  Supersede: {}", summary.supersede);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
