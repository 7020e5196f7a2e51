//! Trailing-edge debouncing keyed by session.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;
use tokio::time::Instant;

/// Coalesces bursts of calls per key into one call after a quiet period.
///
/// Each [`schedule`](Self::schedule) pushes the key's deadline out to
/// `now + delay`; only the last call in a burst fires. The debouncer holds
/// no timers itself: the owner asks for [`next_deadline`](Self::next_deadline),
/// sleeps until then, and collects the keys that are [`due`](Self::due).
#[derive(Debug)]
pub struct Debouncer<K> {
    delay: Duration,
    deadlines: HashMap<K, Instant>,
}

impl<K: Eq + Hash + Clone> Debouncer<K> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadlines: HashMap::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a call for `key` at `now`, superseding any pending one.
    pub fn schedule(&mut self, key: K, now: Instant) {
        self.deadlines.insert(key, now + self.delay);
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.deadlines.contains_key(key)
    }

    /// Drop a pending call without firing it.
    pub fn cancel(&mut self, key: &K) {
        self.deadlines.remove(key);
    }

    /// The earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Remove and return every key whose deadline is at or before `now`.
    pub fn due(&mut self, now: Instant) -> Vec<K> {
        let due: Vec<K> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &due {
            self.deadlines.remove(key);
        }
        due
    }

    /// Remove and return every pending key regardless of deadline.
    pub fn drain(&mut self) -> Vec<K> {
        self.deadlines.drain().map(|(key, _)| key).collect()
    }
}
