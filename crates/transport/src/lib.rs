//! # Transport
//!
//! Hero collection transports.
//!
//! Responsibilities:
//! - Issue get/list/filter/create/update/delete against the collection
//! - Map every failure to `TransportError` (status, timeout, decode)
//! - Provide a seeded in-memory collection for tests and offline runs
//!
//! Nothing here retries or caches; the gateway owns recovery.

pub mod error;
pub mod http_client;
pub mod memory;
pub mod seed;

pub use contracts::{HeroTransport, TransportError};
pub use error::{Result, TransportOp};
pub use http_client::HttpHeroTransport;
pub use memory::{InMemoryConfig, InMemoryHeroTransport};
pub use seed::seed_heroes;
