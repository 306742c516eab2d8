//! In-memory hero collection
//!
//! Behaves like the remote endpoint (server-assigned ids, 404 on unknown ids,
//! case-insensitive name filter) and supports injecting failures and latency.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use contracts::{Ack, HeroId, HeroRecord, HeroTransport, NewHero, TransportError};
use tracing::instrument;

use crate::error::{Result, TransportOp};
use crate::seed::seed_heroes;

/// First id handed out when the collection is empty
const FIRST_ID: HeroId = 11;

/// In-memory transport configuration
#[derive(Debug, Clone)]
pub struct InMemoryConfig {
    /// Initial collection
    pub seed: Vec<HeroRecord>,
    /// Operations that fail, with the status they fail with
    pub fail: HashMap<TransportOp, u16>,
    /// Delay applied to every call
    pub latency: Duration,
    /// Extra delay for `list_where` keyed by the exact filter term
    pub search_latency: HashMap<String, Duration>,
}

impl Default for InMemoryConfig {
    fn default() -> Self {
        Self {
            seed: seed_heroes(),
            fail: HashMap::new(),
            latency: Duration::ZERO,
            search_latency: HashMap::new(),
        }
    }
}

impl InMemoryConfig {
    /// Start from an empty collection
    pub fn empty() -> Self {
        Self {
            seed: Vec::new(),
            ..Default::default()
        }
    }

    pub fn failing(mut self, op: TransportOp, status: u16) -> Self {
        self.fail.insert(op, status);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_search_latency(mut self, term: impl Into<String>, latency: Duration) -> Self {
        self.search_latency.insert(term.into(), latency);
        self
    }
}

/// In-memory transport
pub struct InMemoryHeroTransport {
    heroes: Mutex<BTreeMap<HeroId, HeroRecord>>,
    fail: Mutex<HashMap<TransportOp, u16>>,
    latency: Duration,
    search_latency: HashMap<String, Duration>,
    calls: HashMap<TransportOp, AtomicU64>,
    search_terms: Mutex<Vec<String>>,
}

impl InMemoryHeroTransport {
    /// Seeded collection, no failures, no latency
    pub fn new() -> Self {
        Self::with_config(InMemoryConfig::default())
    }

    pub fn with_config(config: InMemoryConfig) -> Self {
        let heroes = config
            .seed
            .into_iter()
            .map(|hero| (hero.id, hero))
            .collect();

        Self {
            heroes: Mutex::new(heroes),
            fail: Mutex::new(config.fail),
            latency: config.latency,
            search_latency: config.search_latency,
            calls: TransportOp::ALL
                .into_iter()
                .map(|op| (op, AtomicU64::new(0)))
                .collect(),
            search_terms: Mutex::new(Vec::new()),
        }
    }

    /// Make `op` fail with `status`, or succeed again with `None`
    pub fn set_failure(&self, op: TransportOp, status: Option<u16>) {
        let mut fail = lock(&self.fail);
        match status {
            Some(status) => fail.insert(op, status),
            None => fail.remove(&op),
        };
    }

    /// Number of calls made for `op`, failed ones included
    pub fn calls(&self, op: TransportOp) -> u64 {
        self.calls
            .get(&op)
            .map(|count| count.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Total calls across all operations
    pub fn total_calls(&self) -> u64 {
        TransportOp::ALL.iter().map(|op| self.calls(*op)).sum()
    }

    /// Filter terms received by `list_where`, in call order
    pub fn search_terms(&self) -> Vec<String> {
        lock(&self.search_terms).clone()
    }

    /// Current collection snapshot, ordered by id
    pub fn snapshot(&self) -> Vec<HeroRecord> {
        lock(&self.heroes).values().cloned().collect()
    }

    async fn enter(&self, op: TransportOp, target: &str) -> Result<()> {
        if let Some(count) = self.calls.get(&op) {
            count.fetch_add(1, Ordering::SeqCst);
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let status = lock(&self.fail).get(&op).copied();
        match status {
            Some(status) => Err(TransportError::status(
                op.method(),
                target,
                status,
                "injected failure",
            )),
            None => Ok(()),
        }
    }

    fn not_found(op: TransportOp, id: HeroId) -> TransportError {
        TransportError::status(op.method(), item_target(id), 404, "hero not found")
    }
}

impl Default for InMemoryHeroTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HeroTransport for InMemoryHeroTransport {
    fn name(&self) -> &str {
        "in_memory"
    }

    #[instrument(name = "memory_transport_get", skip(self))]
    async fn get(&self, id: HeroId) -> Result<HeroRecord> {
        self.enter(TransportOp::Get, &item_target(id)).await?;
        lock(&self.heroes)
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::not_found(TransportOp::Get, id))
    }

    #[instrument(name = "memory_transport_list", skip(self))]
    async fn list(&self) -> Result<Vec<HeroRecord>> {
        self.enter(TransportOp::List, COLLECTION).await?;
        Ok(self.snapshot())
    }

    #[instrument(name = "memory_transport_list_where", skip(self))]
    async fn list_where(&self, name: &str) -> Result<Vec<HeroRecord>> {
        lock(&self.search_terms).push(name.to_string());
        if let Some(delay) = self.search_latency.get(name) {
            tokio::time::sleep(*delay).await;
        }
        self.enter(TransportOp::ListWhere, &format!("{COLLECTION}?name={name}"))
            .await?;

        let needle = name.to_lowercase();
        Ok(lock(&self.heroes)
            .values()
            .filter(|hero| hero.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    #[instrument(name = "memory_transport_create", skip(self, hero), fields(name = %hero.name))]
    async fn create(&self, hero: &NewHero) -> Result<HeroRecord> {
        self.enter(TransportOp::Create, COLLECTION).await?;

        let mut heroes = lock(&self.heroes);
        let id = heroes
            .keys()
            .next_back()
            .map(|max| max + 1)
            .unwrap_or(FIRST_ID);
        let created = HeroRecord::new(id, hero.name.clone());
        heroes.insert(id, created.clone());
        Ok(created)
    }

    #[instrument(name = "memory_transport_update", skip(self, hero), fields(id = hero.id))]
    async fn update(&self, hero: &HeroRecord) -> Result<Ack> {
        self.enter(TransportOp::Update, COLLECTION).await?;

        let mut heroes = lock(&self.heroes);
        match heroes.get_mut(&hero.id) {
            Some(stored) => {
                *stored = hero.clone();
                Ok(Ack::empty())
            }
            None => Err(Self::not_found(TransportOp::Update, hero.id)),
        }
    }

    #[instrument(name = "memory_transport_delete", skip(self))]
    async fn delete(&self, id: HeroId) -> Result<Ack> {
        self.enter(TransportOp::Delete, &item_target(id)).await?;

        match lock(&self.heroes).remove(&id) {
            Some(_) => Ok(Ack::empty()),
            None => Err(Self::not_found(TransportOp::Delete, id)),
        }
    }
}

const COLLECTION: &str = "memory://heroes";

fn item_target(id: HeroId) -> String {
    format!("{COLLECTION}/{id}")
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
