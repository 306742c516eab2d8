//! HeroTransport trait - request/response boundary to the hero collection
//!
//! Thin and swappable: no retries, no caching. Resilience lives in the gateway.

use crate::{Ack, HeroId, HeroRecord, NewHero, TransportError};

/// Hero collection transport
///
/// Implemented by the HTTP client and the in-memory collection.
#[trait_variant::make(HeroTransport: Send)]
pub trait LocalHeroTransport {
    /// Transport name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Fetch one hero by id
    async fn get(&self, id: HeroId) -> Result<HeroRecord, TransportError>;

    /// Fetch the whole collection
    async fn list(&self) -> Result<Vec<HeroRecord>, TransportError>;

    /// Fetch heroes whose name contains `name` (matching is server-defined)
    async fn list_where(&self, name: &str) -> Result<Vec<HeroRecord>, TransportError>;

    /// Create a hero; the returned record carries the server-assigned id
    async fn create(&self, hero: &NewHero) -> Result<HeroRecord, TransportError>;

    /// Replace a whole record
    async fn update(&self, hero: &HeroRecord) -> Result<Ack, TransportError>;

    /// Delete a hero by id
    async fn delete(&self, id: HeroId) -> Result<Ack, TransportError>;
}
