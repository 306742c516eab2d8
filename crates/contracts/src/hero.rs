//! Hero records and the parameter types that address them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned hero identifier
pub type HeroId = i64;

/// A hero as stored by the remote collection.
///
/// `id` is assigned by the server on create and never changes afterwards.
/// Two records with the same `id` describe the same entity even when their
/// other fields differ; use [`HeroRecord::is_same_entity`] for that comparison
/// and `==` for full value equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeroRecord {
    pub id: HeroId,
    pub name: String,
}

impl HeroRecord {
    pub fn new(id: HeroId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// True when both records refer to the same remote entity
    pub fn is_same_entity(&self, other: &HeroRecord) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for HeroRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.name)
    }
}

/// Partial record sent on create; the server fills in `id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHero {
    pub name: String,
}

impl NewHero {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Either a bare id or a full record.
///
/// Delete accepts both forms; the id is resolved here so transports only ever
/// see a plain [`HeroId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeroRef {
    Id(HeroId),
    Record(HeroRecord),
}

impl HeroRef {
    pub fn id(&self) -> HeroId {
        match self {
            Self::Id(id) => *id,
            Self::Record(hero) => hero.id,
        }
    }
}

impl From<HeroId> for HeroRef {
    fn from(id: HeroId) -> Self {
        Self::Id(id)
    }
}

impl From<HeroRecord> for HeroRef {
    fn from(hero: HeroRecord) -> Self {
        Self::Record(hero)
    }
}

impl From<&HeroRecord> for HeroRef {
    fn from(hero: &HeroRecord) -> Self {
        Self::Record(hero.clone())
    }
}

/// Opaque acknowledgement returned by update and delete.
///
/// `body` is `Null` when the server answered with an empty body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    pub body: serde_json::Value,
}

impl Ack {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_body(body: serde_json::Value) -> Self {
        Self { body }
    }
}
