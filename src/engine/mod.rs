//! Builder command engine.
//!
//! Every mutation is a [`Command`] applied to the current [`Workspace`]
//! snapshot. Success commits the new snapshot to a [`HistoryStack`]; failure
//! leaves document and history exactly as they were. Page, header and footer
//! share one history, so global edits undo like any other.

mod audit;
mod commands;
mod config;
mod history;

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{
    GlobalDocument, GlobalSlot, IdGenerator, PageDocument, SectionInstance, UuidIds,
};
use crate::error::{BuilderError, Result};
use crate::logging::{ENGINE_TARGET, LogLevel, event_with_fields, json_kv};
use crate::metrics::MetricSnapshot;
use crate::registry::SchemaRegistry;
use crate::settings::SettingsMap;

pub use audit::{
    BufferedAudit, EngineAudit, EngineAuditEvent, EngineAuditEventBuilder, EngineAuditStage,
    NullAudit,
};
pub use commands::{Command, CommandContext, Position, SectionTarget};
pub use config::EngineConfig;
pub use history::HistoryStack;

/// One history snapshot: the page being edited plus the store's globals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub page: PageDocument,
    pub globals: GlobalDocument,
}

impl Workspace {
    pub fn new(page: PageDocument, globals: GlobalDocument) -> Self {
        Self { page, globals }
    }

    pub fn section(&self, target: &SectionTarget) -> Option<&SectionInstance> {
        match target {
            SectionTarget::Page(id) => self.page.section(id),
            SectionTarget::Global(slot) => self.globals.get(*slot),
        }
    }

    pub(crate) fn section_mut(&mut self, target: &SectionTarget) -> Result<&mut SectionInstance> {
        match target {
            SectionTarget::Page(id) => self
                .page
                .sections
                .iter_mut()
                .find(|section| &section.id == id)
                .ok_or_else(|| BuilderError::NotFound(id.clone())),
            SectionTarget::Global(slot) => self
                .globals
                .get_mut(*slot)
                .ok_or(BuilderError::GlobalSlotEmpty(*slot)),
        }
    }

    /// Every section and block id across page and globals.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.page.ids().chain(self.globals.ids())
    }
}

pub struct BuilderEngine {
    registry: Arc<SchemaRegistry>,
    history: HistoryStack<Workspace>,
    ids: Box<dyn IdGenerator>,
    seen: HashSet<String>,
    config: EngineConfig,
}

impl BuilderEngine {
    pub fn new(registry: Arc<SchemaRegistry>, initial: Workspace) -> Self {
        Self::with_config(registry, initial, EngineConfig::default())
    }

    pub fn with_config(
        registry: Arc<SchemaRegistry>,
        initial: Workspace,
        config: EngineConfig,
    ) -> Self {
        let seen = initial.ids().map(str::to_string).collect();
        let sections = initial.page.len();
        let engine = Self {
            registry,
            history: HistoryStack::new(initial).with_limit(config.history_limit),
            ids: Box::new(UuidIds),
            seen,
            config,
        };
        engine.audit(
            EngineAuditEventBuilder::new(EngineAuditStage::EngineConstructed)
                .detail("sections", sections)
                .finish(),
        );
        engine
    }

    /// Swap the id source, e.g. for deterministic ids in tests.
    pub fn with_id_generator<G>(mut self, ids: G) -> Self
    where
        G: IdGenerator + 'static,
    {
        self.ids = Box::new(ids);
        self
    }

    /// Hand the id source back, leaving uuid ids in its place.
    pub(crate) fn take_id_generator(&mut self) -> Box<dyn IdGenerator> {
        std::mem::replace(&mut self.ids, Box::new(UuidIds))
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn workspace(&self) -> &Workspace {
        self.history.current()
    }

    pub fn page(&self) -> &PageDocument {
        &self.workspace().page
    }

    pub fn globals(&self) -> &GlobalDocument {
        &self.workspace().globals
    }

    pub fn history(&self) -> &HistoryStack<Workspace> {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Apply `command` to the current snapshot and commit the result.
    pub fn execute(&mut self, command: Command) -> Result<&Workspace> {
        let outcome = {
            let mut ctx = CommandContext::new(&self.registry, self.ids.as_mut(), &mut self.seen);
            command.apply(self.history.current(), &mut ctx)
        };
        match outcome {
            Ok(next) => {
                let evicted = self.history.commit(next);
                self.on_commit(&command, evicted);
                Ok(self.history.current())
            }
            Err(err) => {
                self.on_reject(&command, &err);
                Err(err)
            }
        }
    }

    pub fn add_section(
        &mut self,
        type_id: &str,
        preset: Option<usize>,
        position: Position,
    ) -> Result<&SectionInstance> {
        self.execute(Command::AddSection {
            type_id: type_id.to_string(),
            preset,
            position,
        })?;
        let page = &self.history.current().page;
        let index = match position {
            Position::End => page.len() - 1,
            Position::At(index) => index,
        };
        Ok(&page.sections[index])
    }

    pub fn remove_section(&mut self, section_id: &str) -> Result<()> {
        self.execute(Command::RemoveSection {
            section_id: section_id.to_string(),
        })
        .map(|_| ())
    }

    /// Deep copy with fresh ids, placed right after the original. Returns the
    /// new section id.
    pub fn duplicate_section(&mut self, section_id: &str) -> Result<String> {
        self.execute(Command::DuplicateSection {
            section_id: section_id.to_string(),
        })?;
        let page = &self.history.current().page;
        page.position(section_id)
            .and_then(|index| page.sections.get(index + 1))
            .map(|copy| copy.id.clone())
            .ok_or_else(|| BuilderError::NotFound(section_id.to_string()))
    }

    pub fn move_section(&mut self, section_id: &str, to_index: usize) -> Result<()> {
        self.execute(Command::MoveSection {
            section_id: section_id.to_string(),
            to_index,
        })
        .map(|_| ())
    }

    pub fn update_section_settings(&mut self, section_id: &str, partial: SettingsMap) -> Result<()> {
        self.update_settings(SectionTarget::page(section_id), partial)
    }

    pub fn update_settings(&mut self, target: SectionTarget, partial: SettingsMap) -> Result<()> {
        self.execute(Command::UpdateSettings { target, partial })
            .map(|_| ())
    }

    pub fn reset_section_settings(&mut self, target: SectionTarget, keys: &[&str]) -> Result<()> {
        self.execute(Command::ResetSettings {
            target,
            keys: keys.iter().map(|key| key.to_string()).collect(),
        })
        .map(|_| ())
    }

    pub fn set_section_hidden(&mut self, section_id: &str, hidden: bool) -> Result<()> {
        self.execute(Command::SetHidden {
            target: SectionTarget::page(section_id),
            hidden,
        })
        .map(|_| ())
    }

    /// Append or insert a block with empty settings. Returns the block id.
    pub fn add_block(
        &mut self,
        target: SectionTarget,
        block_type: &str,
        position: Position,
    ) -> Result<String> {
        self.execute(Command::AddBlock {
            target: target.clone(),
            block_type: block_type.to_string(),
            position,
        })?;
        self.history
            .current()
            .section(&target)
            .and_then(|section| match position {
                Position::End => section.blocks.last(),
                Position::At(index) => section.blocks.get(index),
            })
            .map(|block| block.id.clone())
            .ok_or_else(|| BuilderError::NotFound(target.label()))
    }

    pub fn remove_block(&mut self, target: SectionTarget, block_id: &str) -> Result<()> {
        self.execute(Command::RemoveBlock {
            target,
            block_id: block_id.to_string(),
        })
        .map(|_| ())
    }

    pub fn update_block_settings(
        &mut self,
        target: SectionTarget,
        block_id: &str,
        partial: SettingsMap,
    ) -> Result<()> {
        self.execute(Command::UpdateBlockSettings {
            target,
            block_id: block_id.to_string(),
            partial,
        })
        .map(|_| ())
    }

    pub fn move_block(&mut self, target: SectionTarget, block_id: &str, to_index: usize) -> Result<()> {
        self.execute(Command::MoveBlock {
            target,
            block_id: block_id.to_string(),
            to_index,
        })
        .map(|_| ())
    }

    pub fn update_page_settings(&mut self, partial: SettingsMap) -> Result<()> {
        self.execute(Command::UpdatePageSettings { partial })
            .map(|_| ())
    }

    pub fn update_global_section(&mut self, slot: GlobalSlot, partial: SettingsMap) -> Result<()> {
        self.update_settings(SectionTarget::Global(slot), partial)
    }

    pub fn install_global_section(
        &mut self,
        slot: GlobalSlot,
        type_id: &str,
        preset: Option<usize>,
    ) -> Result<()> {
        self.execute(Command::InstallGlobal {
            slot,
            type_id: type_id.to_string(),
            preset,
        })
        .map(|_| ())
    }

    /// Commit a whole page, keeping globals. Ids inside `page` are marked as
    /// seen so later commands never reissue them.
    pub fn replace_page(&mut self, page: PageDocument) -> Result<()> {
        self.execute(Command::ReplacePage { page }).map(|_| ())
    }

    /// Build a page with the engine's own id source and commit it, so the new
    /// ids never clash with anything seen in the session.
    pub fn replace_page_with<F>(&mut self, build: F) -> Result<()>
    where
        F: FnOnce(&SchemaRegistry, &mut dyn IdGenerator) -> Result<PageDocument>,
    {
        let page = {
            let mut ctx = CommandContext::new(&self.registry, self.ids.as_mut(), &mut self.seen);
            build(self.registry.as_ref(), &mut ctx as &mut dyn IdGenerator)?
        };
        self.replace_page(page)
    }

    /// Step back one snapshot; `false` when already at the oldest.
    pub fn undo(&mut self) -> bool {
        let moved = self.history.undo().is_some();
        if moved {
            self.config.record_metric(|m| m.record_undo());
            self.on_cursor_move(EngineAuditStage::Undone, "undo");
        }
        moved
    }

    pub fn redo(&mut self) -> bool {
        let moved = self.history.redo().is_some();
        if moved {
            self.config.record_metric(|m| m.record_redo());
            self.on_cursor_move(EngineAuditStage::Redone, "redo");
        }
        moved
    }

    pub fn metrics_snapshot(&self) -> Option<MetricSnapshot> {
        let metrics = self.config.metrics.as_ref()?;
        let guard = metrics.lock().ok()?;
        Some(guard.snapshot(self.history.len()))
    }

    /// Log the current metrics snapshot when both a logger and metrics are
    /// configured.
    pub fn emit_metrics(&self) {
        if let (Some(logger), Some(snapshot)) = (self.config.logger.as_ref(), self.metrics_snapshot())
        {
            let _ = logger.log_event(snapshot.to_log_event(&self.config.metrics_target));
        }
    }

    fn on_commit(&self, command: &Command, evicted: usize) {
        self.config.record_metric(|m| m.record_commit());
        let history_len = self.history.len();
        self.log(
            LogLevel::Debug,
            "command_committed",
            [
                json_kv("command", command.name()),
                json_kv("history_len", history_len),
            ],
        );
        self.audit(
            EngineAuditEventBuilder::new(EngineAuditStage::CommandCommitted)
                .detail("command", command.name())
                .detail("history_len", history_len)
                .finish(),
        );
        if evicted > 0 {
            self.audit(
                EngineAuditEventBuilder::new(EngineAuditStage::HistoryEvicted)
                    .detail("evicted", evicted)
                    .finish(),
            );
        }
    }

    fn on_reject(&self, command: &Command, err: &BuilderError) {
        self.config.record_metric(|m| m.record_rejection());
        let level = if err.is_contract_violation() {
            LogLevel::Error
        } else {
            LogLevel::Warn
        };
        self.log(
            level,
            "command_rejected",
            [
                json_kv("command", command.name()),
                json_kv("error", err.kind()),
                json_kv("detail", err.to_string()),
            ],
        );
        self.audit(
            EngineAuditEventBuilder::new(EngineAuditStage::CommandRejected)
                .detail("command", command.name())
                .detail("error", err.kind())
                .finish(),
        );
    }

    fn on_cursor_move(&self, stage: EngineAuditStage, message: &str) {
        let cursor = self.history.cursor();
        self.log(LogLevel::Debug, message, [json_kv("cursor", cursor)]);
        self.audit(
            EngineAuditEventBuilder::new(stage)
                .detail("cursor", cursor)
                .finish(),
        );
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        if let Some(logger) = self.config.logger.as_ref() {
            let _ = logger.log_event(event_with_fields(level, ENGINE_TARGET, message, fields));
        }
    }

    fn audit(&self, event: EngineAuditEvent) {
        self.config.audit.record(event);
    }
}

impl std::fmt::Debug for BuilderEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuilderEngine")
            .field("sections", &self.page().len())
            .field("history_len", &self.history.len())
            .field("cursor", &self.history.cursor())
            .finish()
    }
}

#[cfg(test)]
mod tests;
