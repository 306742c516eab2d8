//! SearchPipeline - type-ahead driver
//!
//! Raw terms flow through three stages:
//!
//! ```text
//! input ──► Debouncer ──► DistinctUntilChanged ──► SwitchGate ──► output
//!                                                     │
//!                                             spawned search tasks
//! ```
//!
//! Dispatches run in a `JoinSet` owned by the driver. A finished dispatch is
//! delivered only if its generation is still current; one that panicked
//! settles its generation with an empty result set.

use std::collections::HashMap;
use std::sync::Arc;

use async_channel::{Receiver, Sender};
use tokio::sync::mpsc;
use tokio::task::{Id, JoinError, JoinHandle, JoinSet};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, instrument, trace, warn};

use contracts::{HeroRecord, HeroSearch, SearchConfig, SearchResults, SupersedePolicy};

use crate::stages::{Debouncer, DistinctUntilChanged, SwitchGate};
use crate::stats::PipelineStats;

/// Raw-term side of a running pipeline. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SearchInput {
    tx: Sender<String>,
}

impl SearchInput {
    /// Push a raw term (a keystroke snapshot).
    ///
    /// Returns false once the pipeline no longer accepts input.
    pub fn search(&self, term: impl Into<String>) -> bool {
        self.tx.try_send(term.into()).is_ok()
    }

    /// Close the input for every clone; the pipeline then drains and stops
    pub fn close(&self) -> bool {
        self.tx.close()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Handle to a spawned pipeline
pub struct SearchHandle {
    input: SearchInput,
    output: mpsc::Receiver<SearchResults>,
    task: JoinHandle<PipelineStats>,
}

impl SearchHandle {
    pub fn input(&self) -> SearchInput {
        self.input.clone()
    }

    pub fn search(&self, term: impl Into<String>) -> bool {
        self.input.search(term)
    }

    /// Next delivered result set; `None` once the pipeline stopped
    pub async fn next(&mut self) -> Option<SearchResults> {
        self.output.recv().await
    }

    /// Close the input, collect everything still to be delivered and wait
    /// for the driver to stop.
    pub async fn finish(mut self) -> (Vec<SearchResults>, PipelineStats) {
        self.input.close();

        let mut delivered = Vec::new();
        while let Some(results) = self.output.recv().await {
            delivered.push(results);
        }

        let stats = match self.task.await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "Search pipeline task failed");
                PipelineStats::default()
            }
        };
        (delivered, stats)
    }

    pub fn into_parts(
        self,
    ) -> (
        SearchInput,
        mpsc::Receiver<SearchResults>,
        JoinHandle<PipelineStats>,
    ) {
        (self.input, self.output, self.task)
    }
}

/// Debounce → dedupe → switch-dispatch pipeline over a [`HeroSearch`]
pub struct SearchPipeline<S> {
    searcher: Arc<S>,
    config: SearchConfig,
}

struct PendingDispatch {
    generation: u64,
    term: String,
    started: Instant,
}

impl<S> SearchPipeline<S>
where
    S: HeroSearch + Send + Sync + 'static,
{
    pub fn new(searcher: Arc<S>, config: SearchConfig) -> Self {
        Self { searcher, config }
    }

    /// Spawn the driver on the current runtime
    pub fn spawn(searcher: Arc<S>, config: SearchConfig) -> SearchHandle {
        let (input_tx, input_rx) = async_channel::unbounded();
        let (output_tx, output_rx) = mpsc::channel(config.output_capacity.max(1));

        let pipeline = Self::new(searcher, config);
        let task = tokio::spawn(pipeline.run(input_rx, output_tx));

        SearchHandle {
            input: SearchInput { tx: input_tx },
            output: output_rx,
            task,
        }
    }

    /// Drive the pipeline until the input closes and the current dispatch
    /// has been delivered, or until the consumer goes away.
    #[instrument(
        name = "search_pipeline_run",
        skip_all,
        fields(debounce_ms = self.config.debounce_ms, supersede = ?self.config.supersede)
    )]
    pub async fn run(
        self,
        input: Receiver<String>,
        output: mpsc::Sender<SearchResults>,
    ) -> PipelineStats {
        let mut state = DriverState::new(self.searcher, &self.config);
        let mut input_open = true;

        info!("Search pipeline started");

        loop {
            if !input_open && !state.debouncer.is_pending() && state.gate.in_flight().is_none() {
                break;
            }

            let deadline = state.debouncer.deadline();

            tokio::select! {
                biased;

                _ = output.closed() => {
                    info!("Search consumer dropped, stopping pipeline");
                    break;
                }

                Some(joined) = state.dispatches.join_next_with_id(), if !state.dispatches.is_empty() => {
                    if let Some(results) = state.complete(joined) {
                        if output.send(results).await.is_err() {
                            warn!("Search output closed");
                            break;
                        }
                    }
                }

                received = input.recv(), if input_open => match received {
                    Ok(term) => state.receive(term, Instant::now()),
                    Err(_) => {
                        input_open = false;
                        debug!("Search input closed, flushing pending term");
                        if let Some(term) = state.debouncer.flush() {
                            state.settle(term);
                        }
                    }
                },

                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some(term) = state.debouncer.poll(Instant::now()) {
                        state.settle(term);
                    }
                }
            }
        }

        // Stale dispatches run to completion on their own
        state.dispatches.detach_all();

        let stats = state.stats;
        info!(
            received = stats.received,
            dispatched = stats.dispatched,
            delivered = stats.delivered,
            superseded = stats.superseded,
            failed = stats.failed,
            "Search pipeline stopped"
        );
        stats
    }
}

struct DriverState<S> {
    searcher: Arc<S>,
    policy: SupersedePolicy,
    debouncer: Debouncer,
    distinct: DistinctUntilChanged,
    gate: SwitchGate,
    dispatches: JoinSet<Vec<HeroRecord>>,
    pending: HashMap<Id, PendingDispatch>,
    stats: PipelineStats,
}

impl<S> DriverState<S>
where
    S: HeroSearch + Send + Sync + 'static,
{
    fn new(searcher: Arc<S>, config: &SearchConfig) -> Self {
        Self {
            searcher,
            policy: config.supersede,
            debouncer: Debouncer::new(config.debounce()),
            distinct: DistinctUntilChanged::new(),
            gate: SwitchGate::new(),
            dispatches: JoinSet::new(),
            pending: HashMap::new(),
            stats: PipelineStats::default(),
        }
    }

    fn receive(&mut self, term: String, now: Instant) {
        self.stats.received += 1;
        observability::record_search_term_received();

        if self.policy == SupersedePolicy::OnInput
            && self.gate.in_flight_term().is_some_and(|current| current != term)
        {
            if let Some(generation) = self.gate.supersede() {
                self.mark_superseded(generation);
                // The invalidated term never reached the consumer
                self.distinct.reset();
            }
        }

        if let Some(replaced) = self.debouncer.push(term, now) {
            self.stats.debounced += 1;
            trace!(term = %replaced, "Term debounced away");
        }
    }

    /// A term survived the debounce interval
    fn settle(&mut self, term: String) {
        if !self.distinct.accept(&term) {
            self.stats.deduplicated += 1;
            debug!(term = %term, "Unchanged term dropped");
            return;
        }

        let dispatch = self.gate.begin(term.as_str());
        if let Some(generation) = dispatch.superseded {
            self.mark_superseded(generation);
        }

        self.stats.dispatched += 1;
        observability::record_search_dispatch(dispatch.generation);
        debug!(generation = dispatch.generation, term = %term, "Dispatching search");

        let searcher = Arc::clone(&self.searcher);
        let query = term.clone();
        let task = self
            .dispatches
            .spawn(async move { searcher.search_heroes(&query).await });

        self.pending.insert(
            task.id(),
            PendingDispatch {
                generation: dispatch.generation,
                term,
                started: Instant::now(),
            },
        );
    }

    /// A dispatch task finished, successfully or not
    fn complete(
        &mut self,
        joined: Result<(Id, Vec<HeroRecord>), JoinError>,
    ) -> Option<SearchResults> {
        let (id, outcome) = match joined {
            Ok((id, heroes)) => (id, Ok(heroes)),
            Err(e) => (e.id(), Err(e)),
        };
        let dispatch = self.pending.remove(&id)?;

        let heroes = match outcome {
            Ok(heroes) => heroes,
            Err(e) => {
                self.stats.failed += 1;
                warn!(
                    generation = dispatch.generation,
                    term = %dispatch.term,
                    error = %e,
                    "Search dispatch died"
                );
                Vec::new()
            }
        };

        if !self.gate.complete(dispatch.generation) {
            debug!(
                generation = dispatch.generation,
                term = %dispatch.term,
                "Stale search result dropped"
            );
            return None;
        }

        let latency_ms = dispatch.started.elapsed().as_secs_f64() * 1000.0;
        self.stats.delivered += 1;
        self.stats.latency_ms.push(latency_ms);
        observability::record_search_delivered(heroes.len(), latency_ms);

        Some(SearchResults {
            term: dispatch.term,
            heroes,
        })
    }

    fn mark_superseded(&mut self, generation: u64) {
        self.stats.superseded += 1;
        observability::record_search_superseded();
        debug!(generation, "In-flight search superseded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::sleep;

    const DEBOUNCE: Duration = Duration::from_millis(300);

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    /// Answers every non-blank term with one hero named after it
    #[derive(Default)]
    struct ScriptedSearch {
        delays: HashMap<String, Duration>,
        panics_on: Option<String>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedSearch {
        fn with_delay(mut self, term: &str, delay: Duration) -> Self {
            self.delays.insert(term.to_string(), delay);
            self
        }

        fn panicking_on(mut self, term: &str) -> Self {
            self.panics_on = Some(term.to_string());
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl HeroSearch for ScriptedSearch {
        async fn search_heroes(&self, term: &str) -> Vec<HeroRecord> {
            self.calls.lock().unwrap().push(term.to_string());
            if let Some(delay) = self.delays.get(term) {
                sleep(*delay).await;
            }
            if self.panics_on.as_deref() == Some(term) {
                panic!("search backend crashed on {term:?}");
            }
            if term.trim().is_empty() {
                return Vec::new();
            }
            vec![HeroRecord::new(term.len() as i64, term)]
        }
    }

    fn config(supersede: SupersedePolicy) -> SearchConfig {
        SearchConfig::default()
            .with_debounce(DEBOUNCE)
            .with_supersede(supersede)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_dispatches_last_term_only() {
        let searcher = Arc::new(ScriptedSearch::default());
        let mut handle = SearchPipeline::spawn(searcher.clone(), config(SupersedePolicy::OnInput));

        for term in ["m", "ma", "mag"] {
            handle.search(term);
            sleep(ms(50)).await;
        }

        let results = handle.next().await.unwrap();
        assert_eq!(results.term, "mag");
        assert_eq!(results.heroes, vec![HeroRecord::new(3, "mag")]);

        let (rest, stats) = handle.finish().await;
        assert!(rest.is_empty());
        assert_eq!(searcher.calls(), vec!["mag"]);
        assert_eq!(stats.received, 3);
        assert_eq!(stats.debounced, 2);
        assert_eq!(stats.dispatched, 1);
        assert_eq!(stats.delivered, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_term_is_not_dispatched_again() {
        let searcher = Arc::new(ScriptedSearch::default());
        let mut handle = SearchPipeline::spawn(searcher.clone(), config(SupersedePolicy::OnInput));

        handle.search("mag");
        assert_eq!(handle.next().await.unwrap().term, "mag");

        handle.search("magn");
        sleep(ms(100)).await;
        handle.search("mag");
        sleep(ms(400)).await;

        let (rest, stats) = handle.finish().await;
        assert!(rest.is_empty());
        assert_eq!(searcher.calls(), vec!["mag"]);
        assert_eq!(stats.deduplicated, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_dispatch_wins_over_slow_older_one() {
        let searcher = Arc::new(ScriptedSearch::default().with_delay("slow", ms(1_000)));
        let mut handle =
            SearchPipeline::spawn(searcher.clone(), config(SupersedePolicy::OnDispatch));

        handle.search("slow");
        sleep(ms(400)).await;
        handle.search("mag");

        assert_eq!(handle.next().await.unwrap().term, "mag");

        // "slow" resolves successfully afterwards and must stay invisible
        sleep(ms(1_500)).await;
        let (rest, stats) = handle.finish().await;

        assert!(rest.is_empty());
        assert_eq!(searcher.calls(), vec!["slow", "mag"]);
        assert_eq!(stats.dispatched, 2);
        assert_eq!(stats.superseded, 1);
        assert_eq!(stats.delivered, 1);
        assert_eq!(stats.wasted(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_input_supersedes_in_flight_dispatch() {
        let searcher = Arc::new(ScriptedSearch::default().with_delay("ba", ms(100)));
        let mut handle = SearchPipeline::spawn(searcher.clone(), config(SupersedePolicy::OnInput));

        handle.search("b");
        sleep(ms(50)).await;
        handle.search("ba");
        sleep(ms(350)).await;
        handle.search("bat");

        assert_eq!(handle.next().await.unwrap().term, "bat");

        let (rest, stats) = handle.finish().await;
        assert!(rest.is_empty());
        // "ba" settles at 350 under a strict debounce but is never observed
        assert_eq!(searcher.calls(), vec!["ba", "bat"]);
        assert_eq!(stats.superseded, 1);
        assert_eq!(stats.delivered, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retyping_superseded_term_dispatches_again() {
        let searcher = Arc::new(ScriptedSearch::default().with_delay("bat", ms(500)));
        let mut handle = SearchPipeline::spawn(searcher.clone(), config(SupersedePolicy::OnInput));

        handle.search("bat");
        sleep(ms(400)).await;
        handle.search("bats");
        sleep(ms(50)).await;
        handle.search("bat");

        let results = handle.next().await.unwrap();
        assert_eq!(results.term, "bat");

        let (rest, stats) = handle.finish().await;
        assert!(rest.is_empty());
        assert_eq!(searcher.calls(), vec!["bat", "bat"]);
        assert_eq!(stats.deduplicated, 0);
        assert_eq!(stats.delivered, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_flushes_pending_term() {
        let searcher = Arc::new(ScriptedSearch::default());
        let handle = SearchPipeline::spawn(searcher.clone(), config(SupersedePolicy::OnInput));
        let started = Instant::now();

        handle.search("mag");
        let (delivered, stats) = handle.finish().await;

        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].term, "mag");
        assert_eq!(stats.dispatched, 1);
        assert!(started.elapsed() < DEBOUNCE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_waits_for_current_dispatch() {
        let searcher = Arc::new(ScriptedSearch::default().with_delay("mag", ms(200)));
        let handle = SearchPipeline::spawn(searcher, config(SupersedePolicy::OnInput));

        handle.search("mag");
        sleep(ms(350)).await;
        let (delivered, _) = handle.finish().await;

        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].heroes.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_term_delivers_empty_results() {
        let searcher = Arc::new(ScriptedSearch::default());
        let mut handle = SearchPipeline::spawn(searcher, config(SupersedePolicy::OnInput));

        handle.search("");
        let results = handle.next().await.unwrap();

        assert_eq!(results.term, "");
        assert!(results.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_crashed_dispatch_settles_with_empty_results() {
        let searcher = Arc::new(ScriptedSearch::default().panicking_on("boom"));
        let mut handle = SearchPipeline::spawn(searcher.clone(), config(SupersedePolicy::OnInput));

        handle.search("boom");
        let results = handle.next().await.unwrap();
        assert_eq!(results.term, "boom");
        assert!(results.is_empty());

        handle.search("mag");
        assert_eq!(handle.next().await.unwrap().term, "mag");

        let (rest, stats) = tokio::time::timeout(ms(60_000), handle.finish())
            .await
            .expect("pipeline must stop after a crashed dispatch");
        assert!(rest.is_empty());
        assert_eq!(searcher.calls(), vec!["boom", "mag"]);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.delivered, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finish_returns_after_crashed_final_dispatch() {
        let searcher = Arc::new(ScriptedSearch::default().panicking_on("boom"));
        let handle = SearchPipeline::spawn(searcher, config(SupersedePolicy::OnDispatch));

        handle.search("boom");
        let (delivered, stats) = tokio::time::timeout(ms(60_000), handle.finish())
            .await
            .expect("finish must not hang");

        assert_eq!(delivered.len(), 1);
        assert!(delivered[0].is_empty());
        assert_eq!(stats.failed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_consumer_stops_pipeline() {
        let searcher = Arc::new(ScriptedSearch::default());
        let (input, output, task) =
            SearchPipeline::spawn(searcher.clone(), config(SupersedePolicy::OnInput)).into_parts();

        drop(output);
        let stats = task.await.unwrap();

        assert_eq!(stats.dispatched, 0);
        assert!(!input.search("late"));
        assert!(searcher.calls().is_empty());
    }
}
