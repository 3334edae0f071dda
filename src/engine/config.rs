use std::sync::Arc;

use crate::logging::Logger;
use crate::metrics::{EngineMetrics, SharedMetrics};

use super::audit::{EngineAudit, NullAudit};

/// Knobs for [`BuilderEngine`](super::BuilderEngine) and the session that
/// wraps it.
#[derive(Clone)]
pub struct EngineConfig {
    /// Optional structured logger. Rejected commands that indicate caller
    /// bugs are logged at error level.
    pub logger: Option<Logger>,
    /// Counters shared with whoever holds the handle.
    pub metrics: Option<SharedMetrics>,
    /// Target used when emitting metrics snapshots.
    pub metrics_target: String,
    pub audit: Arc<dyn EngineAudit>,
    /// Maximum snapshots kept for undo. `None` keeps everything.
    pub history_limit: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            logger: None,
            metrics: None,
            metrics_target: "builder::engine.metrics".to_string(),
            audit: Arc::new(NullAudit),
            history_limit: None,
        }
    }
}

impl EngineConfig {
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_metrics(mut self, metrics: SharedMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_audit<A>(mut self, audit: A) -> Self
    where
        A: EngineAudit + 'static,
    {
        self.audit = Arc::new(audit);
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(EngineMetrics::shared());
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    pub fn metrics_handle(&self) -> Option<SharedMetrics> {
        self.metrics.as_ref().map(Arc::clone)
    }

    pub(crate) fn record_metric(&self, record: impl FnOnce(&mut EngineMetrics)) {
        if let Some(metrics) = self.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                record(&mut guard);
            }
        }
    }
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("logger", &self.logger.is_some())
            .field("metrics", &self.metrics.is_some())
            .field("metrics_target", &self.metrics_target)
            .field("history_limit", &self.history_limit)
            .finish()
    }
}
