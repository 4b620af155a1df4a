//! Self-observation counters describing the health of agent plugins.
//!
//! Every counter is a [`Stat`] uniquely identified by (measurement name,
//! field name, tag set). Stats are registered through a [`Registry`] that is
//! constructed once by the owning agent and passed by `Arc` to every
//! component that records into it, so tests can use a fresh registry instead
//! of fighting over process globals.

use relaymon_common::types::format_tags;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

/// A monotonically non-decreasing counter, safe to increment from any number
/// of concurrent gather cycles.
#[derive(Debug)]
pub struct Stat {
    name: String,
    field: String,
    tags: HashMap<String, String>,
    value: AtomicI64,
}

impl Stat {
    /// Measurement name, always prefixed `internal_` (e.g. `"internal_gather"`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field name within the measurement (e.g. `"errors"`).
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn tags(&self) -> &HashMap<String, String> {
        &self.tags
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Adds `delta` to the counter. Counters are contractually monotonic;
    /// callers never pass a negative delta.
    pub fn incr(&self, delta: i64) {
        self.value.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Registry of all self-stat counters for one agent process.
#[derive(Debug, Default)]
pub struct Registry {
    stats: RwLock<HashMap<String, Arc<Stat>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the counter for (measurement, field, tags), creating it
    /// atomically on first use. The stored measurement name is prefixed
    /// `internal_` so self-stats are distinguishable from collected metrics.
    pub fn register(
        &self,
        measurement: &str,
        field: &str,
        tags: HashMap<String, String>,
    ) -> Arc<Stat> {
        let name = format!("internal_{measurement}");
        let key = format!("{name}/{field}/{}", format_tags(&tags));

        if let Some(stat) = self.stats.read().unwrap().get(&key) {
            return Arc::clone(stat);
        }

        let mut stats = self.stats.write().unwrap();
        Arc::clone(stats.entry(key).or_insert_with(|| {
            Arc::new(Stat {
                name,
                field: field.to_string(),
                tags,
                value: AtomicI64::new(0),
            })
        }))
    }

    /// The process-wide gather-error counter aggregated across all plugins.
    pub fn global_gather_errors(&self) -> Arc<Stat> {
        self.register("agent", "gather_errors", HashMap::new())
    }

    /// Snapshot of every registered stat.
    pub fn metrics(&self) -> Vec<Arc<Stat>> {
        self.stats.read().unwrap().values().cloned().collect()
    }
}
