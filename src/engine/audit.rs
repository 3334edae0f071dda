//! Lifecycle audit hooks for the builder engine and session.
//!
//! Records carry a stage plus structured details so callers can buffer or
//! forward them without the engine knowing where they go.

use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use serde_json::Value;

/// Checkpoints emitted by [`BuilderEngine`](super::BuilderEngine) and
/// [`BuilderSession`](crate::session::BuilderSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineAuditStage {
    /// An engine was constructed over an initial workspace.
    EngineConstructed,
    /// A command produced a new snapshot.
    CommandCommitted,
    /// A command failed; document and history are untouched.
    CommandRejected,
    /// Oldest snapshots dropped to honour the history limit.
    HistoryEvicted,
    Undone,
    Redone,
    /// Documents arrived from the store.
    DocumentLoaded,
    SaveStarted,
    SaveCompleted,
    /// Store write failed; the save can be retried.
    SaveFailed,
}

#[derive(Debug, Clone)]
pub struct EngineAuditEvent {
    pub timestamp: SystemTime,
    pub stage: EngineAuditStage,
    pub details: Vec<(String, Value)>,
}

impl EngineAuditEvent {
    fn new(stage: EngineAuditStage) -> Self {
        Self {
            timestamp: SystemTime::now(),
            stage,
            details: Vec::new(),
        }
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }
}

pub struct EngineAuditEventBuilder {
    event: EngineAuditEvent,
}

impl EngineAuditEventBuilder {
    pub fn new(stage: EngineAuditStage) -> Self {
        Self {
            event: EngineAuditEvent::new(stage),
        }
    }

    pub fn detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.event.details.push((key.into(), value.into()));
        self
    }

    pub fn finish(self) -> EngineAuditEvent {
        self.event
    }
}

pub trait EngineAudit: Send + Sync {
    fn record(&self, event: EngineAuditEvent);
}

#[derive(Debug, Default)]
pub struct NullAudit;

impl EngineAudit for NullAudit {
    fn record(&self, _event: EngineAuditEvent) {}
}

/// Keeps records in memory; clones share the buffer.
#[derive(Debug, Clone, Default)]
pub struct BufferedAudit {
    events: Arc<Mutex<Vec<EngineAuditEvent>>>,
}

impl BufferedAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EngineAuditEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn stages(&self) -> Vec<EngineAuditStage> {
        self.events().into_iter().map(|event| event.stage).collect()
    }
}

impl EngineAudit for BufferedAudit {
    fn record(&self, event: EngineAuditEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffered_audit_keeps_details() {
        let audit = BufferedAudit::new();
        let sink: Arc<dyn EngineAudit> = Arc::new(audit.clone());
        sink.record(
            EngineAuditEventBuilder::new(EngineAuditStage::CommandCommitted)
                .detail("command", "add_section")
                .detail("history_len", 2)
                .finish(),
        );
        sink.record(EngineAuditEventBuilder::new(EngineAuditStage::Undone).finish());

        assert_eq!(
            audit.stages(),
            vec![EngineAuditStage::CommandCommitted, EngineAuditStage::Undone]
        );
        let first = &audit.events()[0];
        assert_eq!(first.detail("command"), Some(&Value::from("add_section")));
        assert!(first.detail("missing").is_none());
    }
}
