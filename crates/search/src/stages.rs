//! Pipeline stages as plain state machines.
//!
//! None of these touch the runtime: callers pass the current instant in and
//! read deadlines out, so every transition can be tested with explicit times.

use std::time::Duration;

use tokio::time::Instant;

/// Holds the newest term until the stream goes quiet for `interval`.
#[derive(Debug)]
pub struct Debouncer {
    interval: Duration,
    pending: Option<(String, Instant)>,
}

impl Debouncer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Record a raw term received at `now`.
    ///
    /// Returns the pending term it replaced, if any.
    pub fn push(&mut self, term: String, now: Instant) -> Option<String> {
        self.pending
            .replace((term, now + self.interval))
            .map(|(replaced, _)| replaced)
    }

    /// When the pending term becomes due
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Take the pending term if its quiet interval has elapsed by `now`
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match self.deadline() {
            Some(deadline) if deadline <= now => self.flush(),
            _ => None,
        }
    }

    /// Take the pending term regardless of its deadline
    pub fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|(term, _)| term)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Drops a term equal to the previously accepted one.
#[derive(Debug, Default)]
pub struct DistinctUntilChanged {
    last: Option<String>,
}

impl DistinctUntilChanged {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `term` differs from the last accepted term; it then becomes
    /// the new reference.
    pub fn accept(&mut self, term: &str) -> bool {
        if self.last.as_deref() == Some(term) {
            return false;
        }
        self.last = Some(term.to_string());
        true
    }

    /// Forget the last accepted term
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }
}

/// A dispatch started by [`SwitchGate::begin`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub generation: u64,
    /// Generation this dispatch invalidated, if one was still in flight
    pub superseded: Option<u64>,
}

/// Tracks which dispatch is current.
///
/// Every dispatch gets a strictly increasing generation. Only the in-flight
/// generation may complete; anything older is stale.
#[derive(Debug, Default)]
pub struct SwitchGate {
    generation: u64,
    in_flight: Option<(u64, String)>,
}

impl SwitchGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a dispatch for `term`, invalidating the in-flight one
    pub fn begin(&mut self, term: impl Into<String>) -> Dispatch {
        self.generation += 1;
        let superseded = self
            .in_flight
            .replace((self.generation, term.into()))
            .map(|(generation, _)| generation);
        Dispatch {
            generation: self.generation,
            superseded,
        }
    }

    /// Invalidate the in-flight dispatch without starting a new one
    pub fn supersede(&mut self) -> Option<u64> {
        self.in_flight.take().map(|(generation, _)| generation)
    }

    /// Mark `generation` finished.
    ///
    /// Returns true only if it was still current, i.e. its result may be
    /// delivered.
    pub fn complete(&mut self, generation: u64) -> bool {
        if self.is_current(generation) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    pub fn is_current(&self, generation: u64) -> bool {
        matches!(&self.in_flight, Some((current, _)) if *current == generation)
    }

    /// Term of the in-flight dispatch
    pub fn in_flight_term(&self) -> Option<&str> {
        self.in_flight.as_ref().map(|(_, term)| term.as_str())
    }

    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight.as_ref().map(|(generation, _)| *generation)
    }

    /// Last generation handed out (0 before the first dispatch)
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
