use std::sync::Arc;

use super::*;
use crate::document::SequentialIds;
use crate::engine::{BufferedAudit, Position};
use crate::logging::{Logger, MemorySink};
use crate::metrics::EngineMetrics;
use crate::persistence::MemoryStore;
use crate::settings::{SettingValue, settings_map};

fn registry() -> Arc<SchemaRegistry> {
    Arc::new(SchemaRegistry::with_catalog().unwrap())
}

fn session(store: &MemoryStore, page: &str) -> BuilderSession {
    BuilderSession::new(
        registry(),
        Arc::new(store.clone()),
        SessionConfig::new("acme", page).with_store_name("Acme"),
    )
    .with_id_generator(SequentialIds::new())
}

#[test]
fn mutations_fail_until_loaded() {
    let store = MemoryStore::new();
    let mut session = session(&store, "home");
    assert!(!session.is_loaded());
    assert!(matches!(session.engine_mut(), Err(BuilderError::NotLoaded)));
    assert!(matches!(session.begin_save(), Err(BuilderError::NotLoaded)));
    assert!(matches!(session.reset_page(), Err(BuilderError::NotLoaded)));
    assert!(!session.is_dirty());
}

#[test]
fn missing_documents_load_catalogue_defaults() {
    let store = MemoryStore::new();
    let mut session = session(&store, "home");
    session.load().unwrap();

    let engine = session.engine().unwrap();
    let types: Vec<_> = engine.page().sections.iter().map(|s| s.type_id.as_str()).collect();
    assert_eq!(types, catalog::HOME_SECTIONS.to_vec());
    let header = engine.globals().header.as_ref().unwrap();
    assert_eq!(header.settings.get("logo_text"), Some(&SettingValue::text("Acme")));
    assert!(engine.globals().footer.is_some());
    assert!(!engine.can_undo());

    assert!(session.is_dirty());
    assert_eq!(session.save_state(), &SaveState::Dirty);
}

#[test]
fn other_pages_start_empty() {
    let store = MemoryStore::new();
    let mut session = session(&store, "about");
    session.load().unwrap();
    assert!(session.engine().unwrap().page().is_empty());
}

#[test]
fn save_then_reload_round_trips() {
    let store = MemoryStore::new();
    let mut session = session(&store, "home");
    session.load().unwrap();
    let id = session.engine().unwrap().page().sections[1].id.clone();
    session
        .engine_mut()
        .unwrap()
        .update_section_settings(&id, settings_map([("title", "Summer sale")]))
        .unwrap();
    session.save().unwrap();
    assert_eq!(session.save_state(), &SaveState::Clean);
    assert!(!session.is_dirty());
    assert!(store.raw("acme/global/header").is_some());

    let mut reopened = BuilderSession::new(
        registry(),
        Arc::new(store.clone()),
        SessionConfig::new("acme", "home"),
    );
    reopened.load().unwrap();
    assert_eq!(
        reopened.engine().unwrap().workspace(),
        session.engine().unwrap().workspace()
    );
    assert!(!reopened.is_dirty());
}

#[test]
fn unchanged_globals_are_not_rewritten() {
    let store = MemoryStore::new();
    let mut session = session(&store, "home");
    session.load().unwrap();
    session.save().unwrap();
    let writes = store.writes();

    session
        .engine_mut()
        .unwrap()
        .update_page_settings(settings_map([("fontFamily", "Rubik")]))
        .unwrap();
    let request = session.begin_save().unwrap();
    assert!(request.changed_slots().is_empty());
    let result = request.perform(&store);
    session.finish_save(&request, result).unwrap();
    assert_eq!(store.writes(), writes + 1);
}

#[test]
fn failed_save_is_retryable_and_loses_nothing() {
    let store = MemoryStore::new();
    let metrics = EngineMetrics::shared();
    let mut session = session(&store, "home")
        .with_engine_config(EngineConfig::default().with_metrics(Arc::clone(&metrics)));
    session.load().unwrap();
    let before = session.engine().unwrap().workspace().clone();
    let history_len = session.engine().unwrap().history().len();

    store.set_offline(true);
    let err = session.save().unwrap_err();
    assert!(err.is_recoverable());
    assert!(matches!(session.save_state(), SaveState::Failed(_)));
    assert_eq!(session.engine().unwrap().workspace(), &before);
    assert_eq!(session.engine().unwrap().history().len(), history_len);
    assert!(session.is_dirty());

    store.set_offline(false);
    session.retry_save().unwrap();
    assert_eq!(session.save_state(), &SaveState::Clean);
    assert!(store.contains_page("acme", "home"));

    let snapshot = session.engine().unwrap().metrics_snapshot().unwrap();
    assert_eq!(snapshot.saves, 1);
    assert_eq!(snapshot.save_failures, 1);
}

#[test]
fn save_persists_the_snapshot_taken_at_begin() {
    let store = MemoryStore::new();
    let mut session = session(&store, "about");
    session.load().unwrap();
    session
        .engine_mut()
        .unwrap()
        .add_section("hero", Some(0), Position::End)
        .unwrap();

    let request = session.begin_save().unwrap();
    assert_eq!(session.save_state(), &SaveState::Saving);
    session
        .engine_mut()
        .unwrap()
        .add_section("newsletter", None, Position::End)
        .unwrap();
    let result = request.perform(&store);
    session.finish_save(&request, result).unwrap();

    let stored = store.load_page("acme", "about").unwrap().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(session.engine().unwrap().page().len(), 2);
    assert_eq!(session.save_state(), &SaveState::Dirty);
}

#[test]
fn saving_an_empty_page_deletes_it() {
    let store = MemoryStore::new();
    let mut session = session(&store, "about");
    session.load().unwrap();
    let id = session
        .engine_mut()
        .unwrap()
        .add_section("hero", None, Position::End)
        .unwrap()
        .id
        .clone();
    session.save().unwrap();
    assert!(store.contains_page("acme", "about"));

    session.engine_mut().unwrap().remove_section(&id).unwrap();
    session.save().unwrap();
    assert!(!store.contains_page("acme", "about"));
}

#[test]
fn unknown_stored_content_is_sanitized_on_load() {
    let store = MemoryStore::new();
    let mut page = PageDocument::new();
    let mut hero = SectionInstance::new("hero_legacy", "hero");
    hero.settings = settings_map([("title", "Kept"), ("legacy_flag", "dropped")]);
    page.sections.push(hero);
    page.sections.push(SectionInstance::new("gallery_1", "gallery"));
    store.save_page("acme", "home", &page).unwrap();

    let sink = MemorySink::new();
    let mut session = session(&store, "home")
        .with_engine_config(EngineConfig::default().with_logger(Logger::new(sink.clone())));
    session.load().unwrap();

    let engine = session.engine().unwrap();
    assert_eq!(engine.page().len(), 1);
    assert_eq!(session.last_report().dropped_sections, vec!["gallery_1".to_string()]);
    assert_eq!(
        session.last_report().dropped_settings,
        vec!["hero_legacy.legacy_flag".to_string()]
    );
    assert!(sink.messages().contains(&"load_sanitized".to_string()));
}

#[test]
fn unregistered_global_type_falls_back_to_the_slot_default() {
    let store = MemoryStore::new();
    store
        .save_global("acme", GlobalSlot::Header, &SectionInstance::new("mega_1", "mega_header"))
        .unwrap();

    let mut session = session(&store, "home");
    session.load().unwrap();
    assert_eq!(session.last_report().dropped_sections, vec!["mega_1".to_string()]);
    assert!(session.is_dirty());

    let engine = session.engine_mut().unwrap();
    assert_eq!(engine.globals().header.as_ref().unwrap().type_id, "header");
    engine
        .update_global_section(GlobalSlot::Header, settings_map([("logo_text", "Mega")]))
        .unwrap();
    session.save().unwrap();
    assert_eq!(
        store.load_global("acme", GlobalSlot::Header).unwrap().unwrap().type_id,
        "header"
    );
}

#[test]
fn reset_page_is_undoable_and_uses_fresh_ids() {
    let store = MemoryStore::new();
    let audit = BufferedAudit::new();
    let mut session = session(&store, "home")
        .with_engine_config(EngineConfig::default().with_audit(audit.clone()));
    session.load().unwrap();
    let first_ids: Vec<String> = session
        .engine()
        .unwrap()
        .page()
        .sections
        .iter()
        .map(|s| s.id.clone())
        .collect();

    session.reset_page().unwrap();
    let engine = session.engine().unwrap();
    assert_eq!(engine.page().len(), first_ids.len());
    assert!(engine.page().sections.iter().all(|s| !first_ids.contains(&s.id)));
    assert!(engine.can_undo());
    assert!(audit.stages().contains(&EngineAuditStage::DocumentLoaded));

    session.engine_mut().unwrap().undo();
    let restored: Vec<String> = session
        .engine()
        .unwrap()
        .page()
        .sections
        .iter()
        .map(|s| s.id.clone())
        .collect();
    assert_eq!(restored, first_ids);
}

#[test]
fn failed_load_leaves_session_unloaded() {
    let store = MemoryStore::new();
    store.set_offline(true);
    let mut session = session(&store, "home");
    assert!(matches!(
        session.load(),
        Err(BuilderError::Persistence(PersistenceError::Offline))
    ));
    assert!(!session.is_loaded());

    store.set_offline(false);
    session.load().unwrap();
    assert!(session.is_loaded());
}
