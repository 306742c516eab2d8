//! 配置校验模块
//!
//! 校验规则：
//! - 字段级约束 (`#[validate]` 派生：url、range、length)
//! - base_url 仅允许 http / https
//! - collection 为单个路径段
//! - request_timeout_ms >= connect_timeout_ms
//! - log_prefix 不含换行

use ::validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use contracts::{ContractError, HeroesConfig};

/// 校验 HeroesConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &HeroesConfig) -> Result<(), ContractError> {
    validate_fields(config)?;
    validate_transport(config)?;
    validate_gateway(config)?;
    Ok(())
}

/// 字段级校验 (validator derive)
fn validate_fields(config: &HeroesConfig) -> Result<(), ContractError> {
    let Err(errors) = config.validate() else {
        return Ok(());
    };

    let mut violations = Vec::new();
    collect_violations(&errors, "", &mut violations);
    // HashMap 顺序不稳定，排序后取第一个
    violations.sort();

    let (field, message) = violations
        .into_iter()
        .next()
        .unwrap_or_else(|| ("config".to_string(), errors.to_string()));
    Err(ContractError::config_validation(field, message))
}

fn collect_violations(errors: &ValidationErrors, prefix: &str, out: &mut Vec<(String, String)>) {
    for (field, kind) in errors.errors() {
        let path = format!("{prefix}{field}");
        match kind {
            ValidationErrorsKind::Field(list) => {
                for error in list {
                    out.push((path.clone(), describe(error)));
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                collect_violations(nested, &format!("{path}."), out);
            }
            ValidationErrorsKind::List(items) => {
                for (idx, nested) in items {
                    collect_violations(nested, &format!("{path}[{idx}]."), out);
                }
            }
        }
    }
}

fn describe(error: &ValidationError) -> String {
    match &error.message {
        Some(message) => message.to_string(),
        None => format!("failed `{}` check", error.code),
    }
}

/// 校验 transport 配置
fn validate_transport(config: &HeroesConfig) -> Result<(), ContractError> {
    let transport = &config.transport;

    if !(transport.base_url.starts_with("http://") || transport.base_url.starts_with("https://"))
    {
        return Err(ContractError::config_validation(
            "transport.base_url",
            format!(
                "base_url must use http or https, got '{}'",
                transport.base_url
            ),
        ));
    }

    if transport.collection.contains('/')
        || transport.collection.chars().any(char::is_whitespace)
    {
        return Err(ContractError::config_validation(
            "transport.collection",
            format!(
                "collection must be a single path segment, got '{}'",
                transport.collection
            ),
        ));
    }

    if transport.request_timeout_ms < transport.connect_timeout_ms {
        return Err(ContractError::config_validation(
            "transport.connect_timeout_ms / transport.request_timeout_ms",
            format!(
                "request_timeout_ms ({}) must be >= connect_timeout_ms ({})",
                transport.request_timeout_ms, transport.connect_timeout_ms
            ),
        ));
    }

    Ok(())
}

/// 校验 gateway 配置
fn validate_gateway(config: &HeroesConfig) -> Result<(), ContractError> {
    if config.gateway.log_prefix.contains(['\n', '\r']) {
        return Err(ContractError::config_validation(
            "gateway.log_prefix",
            "log_prefix cannot contain line breaks",
        ));
    }
    Ok(())
}
