//! Layered error definitions
//!
//! Categorized by source: config / transport

use thiserror::Error;

/// Configuration and I/O errors
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Failure of a single request against the hero collection.
///
/// Covers network failures, timeouts, non-2xx responses and undecodable
/// bodies. It is absorbed by the gateway and never reaches UI code.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request could not be sent or completed
    #[error("{method} {url} failed: {message}")]
    Request {
        method: String,
        url: String,
        message: String,
        timeout: bool,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Server answered with a non-2xx status
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    /// Response body did not match the expected shape
    #[error("{method} {url} returned an unreadable body: {message}")]
    Decode {
        method: String,
        url: String,
        message: String,
    },
}

impl TransportError {
    /// Create a status error
    pub fn status(
        method: impl Into<String>,
        url: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        Self::Status {
            method: method.into(),
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    /// Create a request error without an underlying source
    pub fn request(
        method: impl Into<String>,
        url: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Request {
            method: method.into(),
            url: url.into(),
            message: message.into(),
            timeout: false,
            source: None,
        }
    }

    /// Create a decode error
    pub fn decode(
        method: impl Into<String>,
        url: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Decode {
            method: method.into(),
            url: url.into(),
            message: message.into(),
        }
    }

    /// Protocol status, when the server produced one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the request ran out of time
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Request { timeout: true, .. })
    }
}
