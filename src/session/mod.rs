//! Builder session: ties an engine to a document store.
//!
//! Until [`BuilderSession::load`] succeeds there is no engine and every
//! mutation fails with [`BuilderError::NotLoaded`]. Saving is split into
//! [`begin_save`](BuilderSession::begin_save), which snapshots the documents,
//! and [`finish_save`](BuilderSession::finish_save), so edits made while a
//! save is in flight are neither lost nor persisted by it.

use std::sync::Arc;

use blake3::Hash;
use serde::Serialize;
use serde_json::Value;

use crate::catalog::{self, HOME_PAGE};
use crate::document::{
    GlobalDocument, GlobalSlot, IdGenerator, PageDocument, SanitizeReport, SectionInstance,
    UuidIds, sanitize_page, sanitize_section,
};
use crate::engine::{
    BuilderEngine, EngineAuditEventBuilder, EngineAuditStage, EngineConfig, Workspace,
};
use crate::error::{BuilderError, Result};
use crate::logging::{LogLevel, SESSION_TARGET, event_with_fields, json_kv};
use crate::persistence::{DocumentStore, PersistenceError, PersistenceResult};
use crate::registry::SchemaRegistry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub store_id: String,
    pub page_key: String,
    /// Used as the logo text of a freshly created header.
    pub store_name: Option<String>,
}

impl SessionConfig {
    pub fn new(store_id: impl Into<String>, page_key: impl Into<String>) -> Self {
        Self {
            store_id: store_id.into(),
            page_key: page_key.into(),
            store_name: None,
        }
    }

    pub fn with_store_name(mut self, name: impl Into<String>) -> Self {
        self.store_name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveState {
    /// Store matches the documents.
    Clean,
    /// Unsaved edits.
    Dirty,
    Saving,
    /// Last save failed; documents and history are intact and the save can be
    /// retried.
    Failed(String),
}

/// Documents captured by [`BuilderSession::begin_save`].
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub id: u64,
    pub store_id: String,
    pub page_key: String,
    pub page: PageDocument,
    pub globals: GlobalDocument,
    page_digest: Option<Hash>,
    global_digests: [Option<Hash>; 2],
    /// Slots whose content differs from the last successful save.
    changed_slots: Vec<GlobalSlot>,
}

impl SaveRequest {
    /// Write the snapshot. A page without sections is deleted rather than
    /// stored; globals are written only when they changed.
    pub fn perform(&self, store: &dyn DocumentStore) -> PersistenceResult<()> {
        if self.page.is_empty() {
            store.delete_page(&self.store_id, &self.page_key)?;
        } else {
            store.save_page(&self.store_id, &self.page_key, &self.page)?;
        }
        for slot in &self.changed_slots {
            if let Some(section) = self.globals.get(*slot) {
                store.save_global(&self.store_id, *slot, section)?;
            }
        }
        Ok(())
    }

    pub fn changed_slots(&self) -> &[GlobalSlot] {
        &self.changed_slots
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Saved {
    page: Option<Hash>,
    globals: [Option<Hash>; 2],
}

fn digest<T: Serialize>(value: &T) -> Option<Hash> {
    serde_json::to_vec(value)
        .ok()
        .map(|bytes| blake3::hash(&bytes))
}

fn slot_index(slot: GlobalSlot) -> usize {
    match slot {
        GlobalSlot::Header => 0,
        GlobalSlot::Footer => 1,
    }
}

pub struct BuilderSession {
    config: SessionConfig,
    engine_config: EngineConfig,
    registry: Arc<SchemaRegistry>,
    store: Arc<dyn DocumentStore>,
    engine: Option<BuilderEngine>,
    ids: Option<Box<dyn IdGenerator>>,
    saved: Saved,
    state: SaveState,
    next_request: u64,
    last_report: SanitizeReport,
}

impl BuilderSession {
    pub fn new(
        registry: Arc<SchemaRegistry>,
        store: Arc<dyn DocumentStore>,
        config: SessionConfig,
    ) -> Self {
        Self {
            config,
            engine_config: EngineConfig::default(),
            registry,
            store,
            engine: None,
            ids: None,
            saved: Saved::default(),
            state: SaveState::Clean,
            next_request: 1,
            last_report: SanitizeReport::default(),
        }
    }

    pub fn with_engine_config(mut self, config: EngineConfig) -> Self {
        self.engine_config = config;
        self
    }

    pub fn with_id_generator<G>(mut self, ids: G) -> Self
    where
        G: IdGenerator + 'static,
    {
        self.ids = Some(Box::new(ids));
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn DocumentStore> {
        Arc::clone(&self.store)
    }

    pub fn is_loaded(&self) -> bool {
        self.engine.is_some()
    }

    pub fn engine(&self) -> Result<&BuilderEngine> {
        self.engine.as_ref().ok_or(BuilderError::NotLoaded)
    }

    /// Mutations go through here so they fail until the documents are loaded.
    pub fn engine_mut(&mut self) -> Result<&mut BuilderEngine> {
        self.engine.as_mut().ok_or(BuilderError::NotLoaded)
    }

    pub fn save_state(&self) -> &SaveState {
        &self.state
    }

    /// What was dropped while sanitizing the last load.
    pub fn last_report(&self) -> &SanitizeReport {
        &self.last_report
    }

    /// Fetch page and globals and start a fresh engine over them. Missing
    /// documents fall back to catalogue defaults, which count as unsaved.
    pub fn load(&mut self) -> Result<()> {
        let mut ids = self.take_ids();
        let outcome = self.fetch(&mut ids);
        let (workspace, saved, report) = match outcome {
            Ok(loaded) => loaded,
            Err(err) => {
                self.ids = Some(ids);
                self.log(
                    LogLevel::Warn,
                    "load_failed",
                    [json_kv("error", err.to_string())],
                );
                return Err(err);
            }
        };

        if !report.is_clean() {
            self.log(
                LogLevel::Warn,
                "load_sanitized",
                [
                    json_kv("dropped_sections", report.dropped_sections.clone()),
                    json_kv("dropped_blocks", report.dropped_blocks.clone()),
                    json_kv("dropped_settings", report.dropped_settings.clone()),
                ],
            );
        }
        let sections = workspace.page.len();
        self.engine = Some(
            BuilderEngine::with_config(
                Arc::clone(&self.registry),
                workspace,
                self.engine_config.clone(),
            )
            .with_id_generator(ids),
        );
        self.saved = saved;
        self.last_report = report;
        self.state = if self.is_dirty() {
            SaveState::Dirty
        } else {
            SaveState::Clean
        };
        self.log(
            LogLevel::Info,
            "loaded",
            [
                json_kv("store", self.config.store_id.clone()),
                json_kv("page", self.config.page_key.clone()),
                json_kv("sections", sections),
            ],
        );
        self.engine_config.audit.record(
            EngineAuditEventBuilder::new(EngineAuditStage::DocumentLoaded)
                .detail("page", self.config.page_key.clone())
                .detail("sections", sections)
                .finish(),
        );
        Ok(())
    }

    fn take_ids(&mut self) -> Box<dyn IdGenerator> {
        if let Some(ids) = self.ids.take() {
            return ids;
        }
        match self.engine.as_mut() {
            Some(engine) => engine.take_id_generator(),
            None => Box::new(UuidIds),
        }
    }

    fn fetch(&self, ids: &mut Box<dyn IdGenerator>) -> Result<(Workspace, Saved, SanitizeReport)> {
        let SessionConfig {
            store_id,
            page_key,
            store_name,
        } = &self.config;
        let mut saved = Saved::default();

        let (page, mut report) = match self.store.load_page(store_id, page_key)? {
            Some(stored) => {
                saved.page = digest(&stored);
                sanitize_page(stored, &self.registry)
            }
            None if page_key == HOME_PAGE => (
                catalog::default_home_page(&self.registry, ids.as_mut())?,
                SanitizeReport::default(),
            ),
            None => (PageDocument::new(), SanitizeReport::default()),
        };

        let mut globals = GlobalDocument::new();
        for slot in GlobalSlot::ALL {
            let section: SectionInstance = match self.store.load_global(store_id, slot)? {
                Some(stored) if self.registry.contains(&stored.type_id) => {
                    saved.globals[slot_index(slot)] = digest(&stored);
                    sanitize_section(stored, &self.registry, &mut report)
                }
                stored => {
                    if let Some(stored) = stored {
                        report.dropped_sections.push(stored.id);
                    }
                    catalog::default_global(
                        slot,
                        &self.registry,
                        ids.as_mut(),
                        store_name.as_deref(),
                    )?
                }
            };
            globals.set(slot, Some(section));
        }
        Ok((Workspace::new(page, globals), saved, report))
    }

    /// Whether the current documents differ from what was last loaded or saved.
    pub fn is_dirty(&self) -> bool {
        let Some(engine) = self.engine.as_ref() else {
            return false;
        };
        let current = self.digests(engine.workspace());
        current != self.saved
    }

    fn digests(&self, workspace: &Workspace) -> Saved {
        let mut saved = Saved {
            page: digest(&workspace.page),
            globals: [None; 2],
        };
        for slot in GlobalSlot::ALL {
            saved.globals[slot_index(slot)] = workspace.globals.get(slot).and_then(digest);
        }
        saved
    }

    /// Snapshot the current documents for saving.
    pub fn begin_save(&mut self) -> Result<SaveRequest> {
        let engine = self.engine.as_ref().ok_or(BuilderError::NotLoaded)?;
        let workspace = engine.workspace().clone();
        let digests = self.digests(&workspace);
        let changed_slots = GlobalSlot::ALL
            .into_iter()
            .filter(|slot| {
                let index = slot_index(*slot);
                digests.globals[index] != self.saved.globals[index]
            })
            .collect();

        let request = SaveRequest {
            id: self.next_request,
            store_id: self.config.store_id.clone(),
            page_key: self.config.page_key.clone(),
            page: workspace.page,
            globals: workspace.globals,
            page_digest: digests.page,
            global_digests: digests.globals,
            changed_slots,
        };
        self.next_request += 1;
        self.state = SaveState::Saving;
        self.log(
            LogLevel::Debug,
            "save_started",
            [
                json_kv("request", request.id),
                json_kv("sections", request.page.len()),
            ],
        );
        self.engine_config.audit.record(
            EngineAuditEventBuilder::new(EngineAuditStage::SaveStarted)
                .detail("request", request.id)
                .finish(),
        );
        Ok(request)
    }

    /// Record the outcome of a save. On failure nothing in memory changes and
    /// the state becomes [`SaveState::Failed`].
    pub fn finish_save(
        &mut self,
        request: &SaveRequest,
        result: PersistenceResult<()>,
    ) -> Result<()> {
        match result {
            Ok(()) => {
                self.saved = Saved {
                    page: request.page_digest,
                    globals: request.global_digests,
                };
                self.state = if self.is_dirty() {
                    SaveState::Dirty
                } else {
                    SaveState::Clean
                };
                self.engine_config.record_metric(|m| m.record_save(true));
                self.log(
                    LogLevel::Info,
                    "saved",
                    [
                        json_kv("request", request.id),
                        json_kv("deleted", request.page.is_empty()),
                    ],
                );
                self.engine_config.audit.record(
                    EngineAuditEventBuilder::new(EngineAuditStage::SaveCompleted)
                        .detail("request", request.id)
                        .finish(),
                );
                Ok(())
            }
            Err(err) => {
                self.fail_save(request, &err);
                Err(err.into())
            }
        }
    }

    fn fail_save(&mut self, request: &SaveRequest, err: &PersistenceError) {
        self.state = SaveState::Failed(err.to_string());
        self.engine_config.record_metric(|m| m.record_save(false));
        self.log(
            LogLevel::Warn,
            "save_failed",
            [
                json_kv("request", request.id),
                json_kv("error", err.to_string()),
            ],
        );
        self.engine_config.audit.record(
            EngineAuditEventBuilder::new(EngineAuditStage::SaveFailed)
                .detail("request", request.id)
                .detail("error", err.to_string())
                .finish(),
        );
    }

    /// Snapshot, write and record in one go.
    pub fn save(&mut self) -> Result<()> {
        let request = self.begin_save()?;
        let result = request.perform(self.store.as_ref());
        self.finish_save(&request, result)
    }

    /// Save again after a failure. Equivalent to [`save`](Self::save); the
    /// documents were never touched by the failed attempt.
    pub fn retry_save(&mut self) -> Result<()> {
        self.save()
    }

    /// Replace the page with its starting layout as an undoable edit.
    pub fn reset_page(&mut self) -> Result<()> {
        let is_home = self.config.page_key == HOME_PAGE;
        let engine = self.engine.as_mut().ok_or(BuilderError::NotLoaded)?;
        if is_home {
            engine.replace_page_with(catalog::default_home_page)?;
        } else {
            engine.replace_page(PageDocument::new())?;
        }
        self.refresh_state();
        Ok(())
    }

    /// Recompute the save state after edits made through [`engine_mut`](Self::engine_mut).
    pub fn refresh_state(&mut self) -> &SaveState {
        if !matches!(self.state, SaveState::Saving | SaveState::Failed(_)) {
            self.state = if self.is_dirty() {
                SaveState::Dirty
            } else {
                SaveState::Clean
            };
        }
        &self.state
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        if let Some(logger) = self.engine_config.logger.as_ref() {
            let _ = logger.log_event(event_with_fields(level, SESSION_TARGET, message, fields));
        }
    }
}

#[cfg(test)]
mod tests;
