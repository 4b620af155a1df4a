//! Metric post-processing pipeline for the relaymon agent.
//!
//! Each [`Collector`] implementation gathers a category of raw metrics on
//! demand. A [`running_input::RunningInput`] binds one collector to its
//! configuration and turns every raw metric into either its emitted form or
//! a drop by applying the configured filter, tag merge, and naming rules.

pub mod config;
pub mod error;
pub mod filter;
pub mod running_input;
pub mod transform;


use chrono::Utc;
use relaymon_common::types::{FieldValue, Metric};
use std::collections::HashMap;

/// A pluggable data source that gathers raw metrics on demand.
///
/// Implementations are bound to a [`running_input::RunningInput`] at agent
/// startup and invoked once per collection interval. The trait requires
/// `Send + Sync` because gather cycles may run concurrently from a worker
/// pool sharing one wrapper.
pub trait Collector: Send + Sync {
    /// One-line description of what this collector measures.
    fn description(&self) -> &str;

    /// Example TOML configuration for this collector.
    fn sample_config(&self) -> &str;

    /// Collects current values into `acc`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying data source cannot be read; the
    /// wrapper records it and the cycle produces no metrics.
    fn gather(&self, acc: &mut dyn Accumulator) -> anyhow::Result<()>;
}

/// Receives the raw metrics produced during one gather cycle.
pub trait Accumulator {
    fn add_metric(&mut self, metric: Metric);

    /// Convenience for collectors that produce one measurement at a time.
    /// `None` field values are removed, not errors.
    fn add_fields(
        &mut self,
        measurement: &str,
        fields: HashMap<String, Option<FieldValue>>,
        tags: HashMap<String, String>,
    ) {
        self.add_metric(Metric::new(measurement, tags, fields, Utc::now()));
    }
}

/// Accumulator buffering the raw metrics of a single gather cycle.
#[derive(Debug, Default)]
pub struct BufferAccumulator {
    metrics: Vec<Metric>,
}

impl BufferAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn into_metrics(self) -> Vec<Metric> {
        self.metrics
    }
}

impl Accumulator for BufferAccumulator {
    fn add_metric(&mut self, metric: Metric) {
        self.metrics.push(metric);
    }
}
