//! Error types for CLI operations.

use thiserror::Error;

use contracts::{ContractError, TransportError};
use gateway::GatewayFailure;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration could not be loaded or is invalid
    #[error("Invalid configuration: {0}")]
    Config(#[from] ContractError),

    /// Transport could not be constructed
    #[error("Failed to set up transport: {0}")]
    Transport(#[from] TransportError),

    /// The gateway absorbed a failure; the fallback was shown
    #[error("{operation} failed: {message}")]
    OperationFailed { operation: String, message: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn operation_failed(failure: &GatewayFailure) -> Self {
        Self::OperationFailed {
            operation: failure.operation.clone(),
            message: failure.message.clone(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
