//! HeroGateway - the only entry point for reading and writing heroes
//!
//! Every operation goes through one recovery boundary:
//!
//! 1. attempt the transport call
//! 2. on success, log a success entry and pass the value through unchanged
//! 3. on failure, log `"{operation} failed: {error}"`, publish a
//!    [`GatewayFailure`], and resolve with the operation's fallback
//!
//! | operation | fallback |
//! |---|---|
//! | `get_heroes` | empty list |
//! | `get_hero` | `None` |
//! | `add_hero` | `None` |
//! | `update_hero` | `None` |
//! | `delete_hero` | `None` |
//! | `search_heroes` | empty list |
//!
//! The gateway never returns an error. Callers that need to tell an empty
//! result from a failed one subscribe to [`HeroGateway::subscribe_failures`].

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast;
use tracing::{debug, error, instrument};

use contracts::{
    Ack, GatewayConfig, HeroId, HeroRecord, HeroRef, HeroSearch, HeroTransport, NewHero,
    SharedMessageSink, TransportError,
};

use crate::failure::{GatewayFailure, GatewayOp};
use crate::metrics::GatewayMetrics;

/// Data-access gateway over a hero transport
pub struct HeroGateway<T> {
    transport: T,
    sink: SharedMessageSink,
    config: GatewayConfig,
    failures: broadcast::Sender<GatewayFailure>,
    metrics: Arc<GatewayMetrics>,
}

impl<T> HeroGateway<T>
where
    T: HeroTransport + Sync,
{
    /// Create a gateway with default reporting settings
    pub fn new(transport: T, sink: SharedMessageSink) -> Self {
        Self::with_config(transport, sink, GatewayConfig::default())
    }

    pub fn with_config(transport: T, sink: SharedMessageSink, config: GatewayConfig) -> Self {
        let (failures, _) = broadcast::channel(config.failure_channel_capacity.max(1));
        Self {
            transport,
            sink,
            config,
            failures,
            metrics: Arc::new(GatewayMetrics::new()),
        }
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<GatewayMetrics> {
        &self.metrics
    }

    /// Receive every failure absorbed from now on
    pub fn subscribe_failures(&self) -> broadcast::Receiver<GatewayFailure> {
        self.failures.subscribe()
    }

    /// All heroes; empty on failure
    #[instrument(name = "gateway_get_heroes", skip(self))]
    pub async fn get_heroes(&self) -> Vec<HeroRecord> {
        self.recover(
            GatewayOp::GetHeroes,
            GatewayOp::GetHeroes.to_string(),
            self.transport.list(),
            Some(Vec::new()),
            |_| "fetched heroes".to_string(),
        )
        .await
        .unwrap_or_default()
    }

    /// One hero; `None` on failure
    #[instrument(name = "gateway_get_hero", skip(self))]
    pub async fn get_hero(&self, id: HeroId) -> Option<HeroRecord> {
        self.recover(
            GatewayOp::GetHero,
            format!("{} id={id}", GatewayOp::GetHero),
            self.transport.get(id),
            None,
            |_| format!("fetched hero id={id}"),
        )
        .await
    }

    /// Create a hero; the result carries the server-assigned id
    #[instrument(name = "gateway_add_hero", skip(self, hero), fields(name = %hero.name))]
    pub async fn add_hero(&self, hero: &NewHero) -> Option<HeroRecord> {
        self.recover(
            GatewayOp::AddHero,
            GatewayOp::AddHero.to_string(),
            self.transport.create(hero),
            None,
            |created| format!("added hero w/ id={}", created.id),
        )
        .await
    }

    /// Replace a whole record
    #[instrument(name = "gateway_update_hero", skip(self, hero), fields(id = hero.id))]
    pub async fn update_hero(&self, hero: &HeroRecord) -> Option<Ack> {
        let id = hero.id;
        self.recover(
            GatewayOp::UpdateHero,
            GatewayOp::UpdateHero.to_string(),
            self.transport.update(hero),
            None,
            |_| format!("updated hero id={id}"),
        )
        .await
    }

    /// Delete by id or by record
    #[instrument(name = "gateway_delete_hero", skip(self, hero))]
    pub async fn delete_hero(&self, hero: impl Into<HeroRef>) -> Option<Ack> {
        let id = hero.into().id();
        self.recover(
            GatewayOp::DeleteHero,
            GatewayOp::DeleteHero.to_string(),
            self.transport.delete(id),
            None,
            |_| format!("deleted hero id={id}"),
        )
        .await
    }

    /// Heroes whose name contains `term`; empty on failure.
    ///
    /// A blank term resolves to an empty list at once: no transport call and
    /// no log entry.
    #[instrument(name = "gateway_search_heroes", skip(self))]
    pub async fn search_heroes(&self, term: &str) -> Vec<HeroRecord> {
        if term.trim().is_empty() {
            self.metrics.inc_short_circuits();
            observability::record_search_short_circuit();
            debug!("blank search term, skipping transport");
            return Vec::new();
        }

        self.recover(
            GatewayOp::SearchHeroes,
            GatewayOp::SearchHeroes.to_string(),
            self.transport.list_where(term),
            Some(Vec::new()),
            |found: &Vec<HeroRecord>| {
                if found.is_empty() {
                    format!("no heroes matching \"{term}\"")
                } else {
                    format!("found heroes matching \"{term}\"")
                }
            },
        )
        .await
        .unwrap_or_default()
    }

    async fn recover<V, F, D>(
        &self,
        op: GatewayOp,
        operation: String,
        call: F,
        fallback: Option<V>,
        describe: D,
    ) -> Option<V>
    where
        F: Future<Output = Result<V, TransportError>>,
        D: FnOnce(&V) -> String,
    {
        self.metrics.inc_calls();
        let started = Instant::now();
        let outcome = call.await;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        match outcome {
            Ok(value) => {
                self.metrics.inc_successes();
                observability::record_gateway_call(op.as_str(), true, latency_ms);
                self.log(describe(&value));
                Some(value)
            }
            Err(err) => {
                self.metrics.inc_fallbacks();
                observability::record_gateway_call(op.as_str(), false, latency_ms);
                error!(
                    transport = self.transport.name(),
                    operation = %operation,
                    status = ?err.status_code(),
                    error = %err,
                    "Transport call failed, using fallback"
                );
                self.log(format!("{operation} failed: {err}"));
                // No subscribers is not an error
                let _ = self.failures.send(GatewayFailure::new(op, operation, &err));
                fallback
            }
        }
    }

    fn log(&self, message: String) {
        self.sink
            .add(format!("{}{}", self.config.log_prefix, message));
    }
}

impl<T> HeroSearch for HeroGateway<T>
where
    T: HeroTransport + Sync,
{
    async fn search_heroes(&self, term: &str) -> Vec<HeroRecord> {
        HeroGateway::search_heroes(self, term).await
    }
}
