use std::sync::Arc;

use super::*;
use crate::document::SequentialIds;
use crate::logging::{Logger, MemorySink};
use crate::metrics::EngineMetrics;
use crate::schema::{BlockSchema, Preset, PresetBlock, SectionCategory, SectionSchema};
use crate::settings::{SettingDescriptor, SettingKind, SettingValue, settings_map};

fn registry() -> Arc<SchemaRegistry> {
    let hero = SectionSchema::new("hero", "Hero", SectionCategory::Hero)
        .setting(SettingDescriptor::new(SettingKind::Text, "title", "Title").with_default("Hello"))
        .setting(
            SettingDescriptor::new(SettingKind::Range, "height", "Height")
                .with_range(200.0, 800.0, 10.0)
                .with_default(400),
        )
        .block_type(
            BlockSchema::new("slide", "Slide")
                .setting(SettingDescriptor::new(SettingKind::Text, "caption", "Caption")),
        )
        .max_blocks(2)
        .preset(
            Preset::new("Default", settings_map([("title", "Welcome")]))
                .block(PresetBlock::new("slide", settings_map([("caption", "One")]))),
        );
    let header = SectionSchema::new("header", "Header", SectionCategory::Header).setting(
        SettingDescriptor::new(SettingKind::Text, "logo_text", "Logo").with_default("Store"),
    );
    Arc::new(SchemaRegistry::from_schemas([hero, header]).unwrap())
}

fn engine() -> BuilderEngine {
    BuilderEngine::new(registry(), Workspace::default()).with_id_generator(SequentialIds::new())
}

#[test]
fn undo_then_redo_round_trips() {
    let mut engine = engine();
    let initial = engine.workspace().clone();
    let id = engine.add_section("hero", Some(0), Position::End).unwrap().id.clone();
    engine
        .update_section_settings(&id, settings_map([("title", "Sale")]))
        .unwrap();
    let copy = engine.duplicate_section(&id).unwrap();
    engine.move_section(&copy, 0).unwrap();
    let last = engine.workspace().clone();

    for _ in 0..4 {
        assert!(engine.undo());
    }
    assert_eq!(engine.workspace(), &initial);
    assert!(!engine.undo());

    for _ in 0..4 {
        assert!(engine.redo());
    }
    assert_eq!(engine.workspace(), &last);
    assert!(!engine.redo());
}

#[test]
fn mutation_after_undo_discards_redo_branch() {
    let mut engine = engine();
    let a = engine.workspace().clone();
    engine.add_section("hero", None, Position::End).unwrap();
    let b = engine.workspace().clone();
    engine.add_section("hero", None, Position::End).unwrap();
    let c = engine.workspace().clone();
    engine.undo();
    assert!(engine.can_redo());

    engine
        .update_page_settings(settings_map([("templateName", "Spring")]))
        .unwrap();
    let d = engine.workspace().clone();
    assert!(!engine.can_redo());
    assert_eq!(engine.history().len(), 3);
    assert_eq!(d.page.len(), 1);
    assert_eq!(d.page.sections, b.page.sections);

    assert!(engine.undo());
    assert_eq!(engine.workspace(), &b);
    assert!(engine.undo());
    assert_eq!(engine.workspace(), &a);
    assert!(engine.redo());
    assert!(engine.redo());
    assert_eq!(engine.workspace(), &d);
    assert!(!engine.redo());
    assert_ne!(engine.workspace(), &c);
}

#[test]
fn duplicate_does_not_alias_the_original() {
    let mut engine = engine();
    let original = engine.add_section("hero", Some(0), Position::End).unwrap().id.clone();
    let copy = engine.duplicate_section(&original).unwrap();
    assert_ne!(copy, original);

    let page = engine.page();
    assert_eq!(page.position(&copy), Some(1));
    let (a, b) = (&page.sections[0], &page.sections[1]);
    assert_eq!(a.settings, b.settings);
    assert_ne!(a.blocks[0].id, b.blocks[0].id);

    engine
        .update_section_settings(&copy, settings_map([("title", "Copy")]))
        .unwrap();
    let original_title = engine.page().sections[0].settings.get("title");
    assert_eq!(original_title, Some(&SettingValue::text("Welcome")));
}

#[test]
fn block_limit_rejection_leaves_history_alone() {
    let mut engine = engine();
    let id = engine.add_section("hero", Some(0), Position::End).unwrap().id.clone();
    let target = SectionTarget::page(&id);
    engine.add_block(target.clone(), "slide", Position::End).unwrap();

    let before = engine.workspace().clone();
    let history_len = engine.history().len();
    let err = engine
        .add_block(target, "slide", Position::End)
        .unwrap_err();
    assert!(matches!(err, BuilderError::MaxBlocksExceeded { max: 2, .. }));
    assert_eq!(engine.workspace(), &before);
    assert_eq!(engine.history().len(), history_len);
}

#[test]
fn unknown_references_fail_without_commit() {
    let mut engine = engine();
    assert!(matches!(
        engine.add_section("gallery", None, Position::End),
        Err(BuilderError::UnknownType(_))
    ));
    assert!(matches!(
        engine.remove_section("missing"),
        Err(BuilderError::NotFound(_))
    ));
    assert!(matches!(
        engine.update_global_section(GlobalSlot::Footer, settings_map([("x", 1)])),
        Err(BuilderError::GlobalSlotEmpty(GlobalSlot::Footer))
    ));
    assert_eq!(engine.history().len(), 1);
}

#[test]
fn out_of_range_values_are_invalid() {
    let mut engine = engine();
    let id = engine.add_section("hero", None, Position::End).unwrap().id.clone();
    let err = engine
        .update_section_settings(&id, settings_map([("height", 900)]))
        .unwrap_err();
    assert!(matches!(err, BuilderError::InvalidValue { .. }));
    assert!(!err.is_contract_violation());
}

#[test]
fn global_edits_share_the_history() {
    let mut engine = engine();
    engine
        .install_global_section(GlobalSlot::Header, "header", None)
        .unwrap();
    engine
        .update_global_section(GlobalSlot::Header, settings_map([("logo_text", "Acme")]))
        .unwrap();
    let header = engine.globals().header.as_ref().unwrap();
    assert_eq!(header.settings.get("logo_text"), Some(&SettingValue::text("Acme")));

    engine.undo();
    assert!(engine.globals().header.as_ref().unwrap().settings.is_empty());
    engine.undo();
    assert!(engine.globals().header.is_none());
}

#[test]
fn hidden_flag_and_reset_are_undoable() {
    let mut engine = engine();
    let id = engine.add_section("hero", Some(0), Position::End).unwrap().id.clone();
    engine.set_section_hidden(&id, true).unwrap();
    assert!(engine.page().sections[0].hidden);
    engine
        .reset_section_settings(SectionTarget::page(&id), &["title"])
        .unwrap();
    assert!(engine.page().sections[0].settings.is_empty());

    engine.undo();
    engine.undo();
    assert!(!engine.page().sections[0].hidden);
    assert!(engine.page().sections[0].settings.contains_key("title"));
}

#[test]
fn replaced_page_ids_are_never_reissued() {
    let mut engine = engine();
    let mut page = PageDocument::new();
    page.sections.push(SectionInstance::new("hero_1", "hero"));
    engine.replace_page(page).unwrap();

    let added = engine.add_section("hero", None, Position::End).unwrap().id.clone();
    assert_eq!(added, "hero_2");
}

#[test]
fn executed_replace_page_marks_ids_seen() {
    let mut engine = engine();
    let mut page = PageDocument::new();
    page.sections.push(SectionInstance::new("hero_1", "hero"));
    engine.execute(Command::ReplacePage { page }).unwrap();

    engine.add_section("hero", None, Position::End).unwrap();
    let ids: Vec<&str> = engine.page().ids().collect();
    assert_eq!(ids, ["hero_1", "hero_2"]);
}

#[test]
fn history_limit_caps_snapshots() {
    let config = EngineConfig::default().with_history_limit(3);
    let mut engine = BuilderEngine::with_config(registry(), Workspace::default(), config)
        .with_id_generator(SequentialIds::new());
    for _ in 0..5 {
        engine.add_section("hero", None, Position::End).unwrap();
    }
    assert_eq!(engine.history().len(), 3);
    assert!(engine.undo());
    assert!(engine.undo());
    assert!(!engine.undo());
    assert_eq!(engine.page().len(), 3);
}

#[test]
fn contract_violations_log_at_error_level() {
    let sink = MemorySink::new();
    let audit = BufferedAudit::new();
    let metrics = EngineMetrics::shared();
    let config = EngineConfig::default()
        .with_logger(Logger::new(sink.clone()))
        .with_audit(audit.clone())
        .with_metrics(Arc::clone(&metrics));
    let mut engine = BuilderEngine::with_config(registry(), Workspace::default(), config)
        .with_id_generator(SequentialIds::new());

    let id = engine.add_section("hero", None, Position::End).unwrap().id.clone();
    let _ = engine.move_section(&id, 3);
    let _ = engine.update_section_settings(&id, settings_map([("title", false)]));
    engine.undo();

    let errors = sink.at_level(LogLevel::Error);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field("error"), Some(&Value::from("index_out_of_range")));
    assert_eq!(sink.at_level(LogLevel::Warn).len(), 1);

    assert_eq!(
        audit.stages(),
        vec![
            EngineAuditStage::EngineConstructed,
            EngineAuditStage::CommandCommitted,
            EngineAuditStage::CommandRejected,
            EngineAuditStage::CommandRejected,
            EngineAuditStage::Undone,
        ]
    );

    let snapshot = engine.metrics_snapshot().unwrap();
    assert_eq!(snapshot.commits, 1);
    assert_eq!(snapshot.rejections, 2);
    assert_eq!(snapshot.undos, 1);

    engine.emit_metrics();
    assert_eq!(sink.messages().last().map(String::as_str), Some("engine_metrics"));
}
