//! Storefront site builder: the content model and editing engine behind a
//! schema-driven page builder.
//!
//! Section types are declared as [`SectionSchema`]s and registered in a
//! [`SchemaRegistry`]. Pages hold [`SectionInstance`]s that store only their
//! setting overrides. All edits go through the [`BuilderEngine`], which keeps
//! a snapshot history for undo and redo; a [`BuilderSession`] adds loading
//! and saving against a [`DocumentStore`].

pub mod catalog;
pub mod conditions;
pub mod document;
pub mod engine;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod persistence;
pub mod registry;
pub mod render;
pub mod reorder;
pub mod schema;
pub mod session;
pub mod settings;

pub use conditions::{evaluate, group_settings, visible_settings};
pub use document::{
    BlockInstance, GlobalDocument, GlobalSlot, IdGenerator, PageDocument, SanitizeReport,
    SectionInstance, SequentialIds, UuidIds, effective_values, instantiate, resolve_setting,
    sanitize_page, validate_section,
};
pub use engine::{
    BufferedAudit, BuilderEngine, Command, EngineAudit, EngineAuditEvent, EngineAuditStage,
    EngineConfig, HistoryStack, NullAudit, Position, SectionTarget, Workspace,
};
pub use error::{BuilderError, Result};
pub use logging::{
    ACTIVITY_LOG, FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError,
    LoggingResult, MemorySink, NullSink,
};
pub use metrics::{EngineMetrics, MetricSnapshot, SharedMetrics};
pub use persistence::{DocumentStore, FileStore, MemoryStore, PersistenceError, PersistenceResult};
pub use registry::{SchemaError, SchemaRegistry};
pub use render::{RenderContext, RenderDispatch, RenderedSection, ResolvedBlock, SectionRenderer};
pub use reorder::{drop_index, reorder, reorder_in_place};
pub use schema::{BlockSchema, Preset, PresetBlock, SectionCategory, SectionSchema};
pub use session::{BuilderSession, SaveRequest, SaveState, SessionConfig};
pub use settings::{
    Condition, ConditionOperator, SettingDescriptor, SettingGroup, SettingKind, SettingValue,
    SettingsMap, Validation, ValueError, settings_map,
};
