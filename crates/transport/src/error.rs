//! Transport error helpers

use std::fmt;

use contracts::TransportError;

/// Transport operation kind (used for failure injection and call counting)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportOp {
    Get,
    List,
    ListWhere,
    Create,
    Update,
    Delete,
}

impl TransportOp {
    pub const ALL: [TransportOp; 6] = [
        Self::Get,
        Self::List,
        Self::ListWhere,
        Self::Create,
        Self::Update,
        Self::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::List => "list",
            Self::ListWhere => "list_where",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// HTTP method the operation maps to
    pub fn method(&self) -> &'static str {
        match self {
            Self::Get | Self::List | Self::ListWhere => "GET",
            Self::Create => "POST",
            Self::Update => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for TransportOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wrap a reqwest failure, keeping it as the error source
pub(crate) fn from_reqwest(method: &str, url: &str, err: reqwest::Error) -> TransportError {
    if let Some(status) = err.status() {
        return TransportError::status(method, url, status.as_u16(), err.to_string());
    }
    TransportError::Request {
        method: method.to_string(),
        url: url.to_string(),
        message: err.to_string(),
        timeout: err.is_timeout(),
        source: Some(Box::new(err)),
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, TransportError>;
