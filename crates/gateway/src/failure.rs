//! Gateway failure notifications

use serde::Serialize;
use std::fmt;

use contracts::TransportError;

/// Gateway operation kind.
///
/// Log entries and metrics label operations in snake_case: `getHeroes`
/// appears as `get_heroes`, `getHero` as `get_hero`, `addHero` as `add_hero`,
/// `updateHero` as `update_hero`, `deleteHero` as `delete_hero` and
/// `searchHeroes` as `search_heroes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayOp {
    GetHeroes,
    GetHero,
    AddHero,
    UpdateHero,
    DeleteHero,
    SearchHeroes,
}

impl GatewayOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetHeroes => "get_heroes",
            Self::GetHero => "get_hero",
            Self::AddHero => "add_hero",
            Self::UpdateHero => "update_hero",
            Self::DeleteHero => "delete_hero",
            Self::SearchHeroes => "search_heroes",
        }
    }
}

impl fmt::Display for GatewayOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transport failure the gateway absorbed.
///
/// The caller only sees the fallback value; subscribers of the failure
/// channel see this event and can tell "empty" apart from "failed".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayFailure {
    /// Operation kind
    pub op: GatewayOp,
    /// Operation label as written to the message log (e.g. "get_hero id=7")
    pub operation: String,
    /// Underlying error message
    pub message: String,
    /// Protocol status, when the server produced one
    pub status: Option<u16>,
}

impl GatewayFailure {
    pub(crate) fn new(op: GatewayOp, operation: impl Into<String>, err: &TransportError) -> Self {
        Self {
            op,
            operation: operation.into(),
            message: err.to_string(),
            status: err.status_code(),
        }
    }
}

impl fmt::Display for GatewayFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.operation, self.message)
    }
}
