//! Counters for engine and session activity.

use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::sync::{Arc, Mutex};

pub type SharedMetrics = Arc<Mutex<EngineMetrics>>;

#[derive(Debug, Default, Clone)]
pub struct EngineMetrics {
    commits: u64,
    rejections: u64,
    undos: u64,
    redos: u64,
    saves: u64,
    save_failures: u64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedMetrics {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn record_commit(&mut self) {
        self.commits = self.commits.saturating_add(1);
    }

    pub fn record_rejection(&mut self) {
        self.rejections = self.rejections.saturating_add(1);
    }

    pub fn record_undo(&mut self) {
        self.undos = self.undos.saturating_add(1);
    }

    pub fn record_redo(&mut self) {
        self.redos = self.redos.saturating_add(1);
    }

    pub fn record_save(&mut self, succeeded: bool) {
        if succeeded {
            self.saves = self.saves.saturating_add(1);
        } else {
            self.save_failures = self.save_failures.saturating_add(1);
        }
    }

    pub fn snapshot(&self, history_len: usize) -> MetricSnapshot {
        MetricSnapshot {
            commits: self.commits,
            rejections: self.rejections,
            undos: self.undos,
            redos: self.redos,
            saves: self.saves,
            save_failures: self.save_failures,
            history_len: history_len as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub commits: u64,
    pub rejections: u64,
    pub undos: u64,
    pub redos: u64,
    pub saves: u64,
    pub save_failures: u64,
    pub history_len: u64,
}

impl MetricSnapshot {
    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("commits".to_string(), json!(self.commits));
        map.insert("rejections".to_string(), json!(self.rejections));
        map.insert("undos".to_string(), json!(self.undos));
        map.insert("redos".to_string(), json!(self.redos));
        map.insert("saves".to_string(), json!(self.saves));
        map.insert("save_failures".to_string(), json!(self.save_failures));
        map.insert("history_len".to_string(), json!(self.history_len));
        map
    }

    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "engine_metrics", self.as_fields())
    }
}
