use crate::config::InputConfig;
use crate::error::Result;
use crate::filter::CompiledFilter;
use crate::transform::{merge_tags, transform_name};
use crate::{BufferAccumulator, Collector};
use relaymon_common::id;
use relaymon_common::types::Metric;
use relaymon_selfstat::{Registry, Stat};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// A collector bound to its immutable configuration and self-stat counters.
///
/// Created once at agent startup. Default tags are set exactly once by the
/// owning agent before the first gather cycle and are read-only afterwards;
/// only metric production is expected to be concurrent.
pub struct RunningInput {
    collector: Arc<dyn Collector>,
    config: InputConfig,
    filter: CompiledFilter,
    id: String,
    default_tags: HashMap<String, String>,
    gather_errors: Arc<Stat>,
    gather_time_ns: Arc<Stat>,
    global_gather_errors: Arc<Stat>,
}

impl RunningInput {
    /// Binds `collector` to `config`, compiling the filter.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::PipelineError::InvalidPattern`] if the
    /// configured filter carries a malformed pattern. This surfaces at
    /// startup and is not retried.
    pub fn new(
        collector: Arc<dyn Collector>,
        config: InputConfig,
        registry: &Registry,
    ) -> Result<Self> {
        let filter = config.filter.compile()?;
        let stat_tags = HashMap::from([("input".to_string(), config.name.clone())]);
        Ok(Self {
            filter,
            id: id::next_id(),
            default_tags: HashMap::new(),
            gather_errors: registry.register("gather", "errors", stat_tags.clone()),
            gather_time_ns: registry.register("gather", "gather_time_ns", stat_tags),
            global_gather_errors: registry.global_gather_errors(),
            collector,
            config,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    pub fn collector(&self) -> &Arc<dyn Collector> {
        &self.collector
    }

    /// Sets the process-wide default tags. Called exactly once by the owning
    /// agent before concurrent use begins; setting them concurrently with
    /// reads is undefined and avoided by contract.
    pub fn set_default_tags(&mut self, tags: HashMap<String, String>) {
        self.default_tags = tags;
    }

    /// Turns one raw collector metric into its emitted form, or drops it.
    ///
    /// Steps, strictly ordered: filter on the raw name and tags; drop
    /// field-less metrics; merge tags; project tags; transform the name.
    /// Pure beyond the returned metric and safe to call concurrently.
    pub fn make_metric(&self, metric: Metric) -> Option<Metric> {
        if !self.filter.matches(&metric.name, &metric.tags) {
            return None;
        }
        if !metric.has_fields() {
            return None;
        }

        let mut tags = merge_tags(&self.default_tags, metric.tags, &self.config.tags);
        self.filter.project_tags(&mut tags);

        let name = transform_name(
            metric.name,
            self.config.name_override.as_deref(),
            &self.config.measurement_prefix,
            &self.config.measurement_suffix,
        );

        Some(Metric {
            name,
            tags,
            fields: metric.fields,
            timestamp: metric.timestamp,
        })
    }

    /// Runs one gather cycle: invokes the collector, then routes every raw
    /// metric through [`Self::make_metric`].
    ///
    /// # Errors
    ///
    /// A collector failure is counted against this plugin's gather-error
    /// stats and reported upward; it is not fatal to the wrapper.
    pub fn gather(&self) -> anyhow::Result<Vec<Metric>> {
        let start = Instant::now();
        let mut acc = BufferAccumulator::new();
        if let Err(e) = self.collector.gather(&mut acc) {
            self.logger().error(&format!("error in plugin: {e}"));
            return Err(e);
        }
        self.gather_time_ns.incr(start.elapsed().as_nanos() as i64);

        Ok(acc
            .into_metrics()
            .into_iter()
            .filter_map(|m| self.make_metric(m))
            .collect())
    }

    /// A logger scoped to this plugin. Error-severity calls are an
    /// observable event: each one increments the plugin's gather-error
    /// counter and the process aggregate.
    pub fn logger(&self) -> PluginLogger {
        PluginLogger {
            input: self.config.name.clone(),
            gather_errors: Arc::clone(&self.gather_errors),
            global_gather_errors: Arc::clone(&self.global_gather_errors),
        }
    }
}

/// Plugin-scoped logger handed out by [`RunningInput::logger`].
#[derive(Clone)]
pub struct PluginLogger {
    input: String,
    gather_errors: Arc<Stat>,
    global_gather_errors: Arc<Stat>,
}

impl PluginLogger {
    /// Logs at error severity and increments the plugin's gather-error
    /// counter and the process aggregate, exactly once per call.
    pub fn error(&self, message: &str) {
        tracing::error!(input = %self.input, "{message}");
        self.gather_errors.incr(1);
        self.global_gather_errors.incr(1);
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(input = %self.input, "{message}");
    }

    pub fn info(&self, message: &str) {
        tracing::info!(input = %self.input, "{message}");
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!(input = %self.input, "{message}");
    }
}
