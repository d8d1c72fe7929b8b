//! Process-wide event counters. The only state in this crate that isn't
//! owned per-key through the deps bundle — append-only and safe to read
//! concurrently from anywhere (a `/health` handler, a future metrics
//! endpoint) without coordinating with the event pipeline.

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    counters: DashMap<String, AtomicU64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event_type: &str) {
        self.counters
            .entry(event_type.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.counters
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().load(Ordering::Relaxed)))
            .collect()
    }

    pub fn total(&self) -> u64 {
        self.counters.iter().map(|e| e.value().load(Ordering::Relaxed)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_events_by_type() {
        let metrics = Metrics::new();
        metrics.record("session.start");
        metrics.record("session.start");
        metrics.record("thinking.start");

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.get("session.start"), Some(&2));
        assert_eq!(snapshot.get("thinking.start"), Some(&1));
        assert_eq!(metrics.total(), 3);
    }
}
