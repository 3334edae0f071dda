use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use storefront_builder::{
    BuilderEngine, EngineConfig, Logger, NullSink, PageDocument, Position, RenderContext,
    RenderDispatch, SchemaRegistry, SectionTarget, SequentialIds, SettingValue, Workspace, catalog,
    settings_map, visible_settings,
};

fn registry() -> Arc<SchemaRegistry> {
    Arc::new(SchemaRegistry::with_catalog().expect("catalog"))
}

fn home_page(registry: &SchemaRegistry) -> PageDocument {
    let mut ids = SequentialIds::new();
    catalog::default_home_page(registry, &mut ids).expect("home page")
}

fn engine_edit_script(c: &mut Criterion) {
    let registry = registry();
    let page = home_page(&registry);
    c.bench_function("engine_edit_script", |b| {
        b.iter(|| {
            let config = EngineConfig::default().with_logger(Logger::new(NullSink));
            let mut engine = BuilderEngine::with_config(
                Arc::clone(&registry),
                Workspace::new(page.clone(), Default::default()),
                config,
            )
            .with_id_generator(SequentialIds::starting_at(1_000));
            for _ in 0..10 {
                let id = engine
                    .add_section("hero", Some(0), Position::At(1))
                    .expect("add")
                    .id
                    .clone();
                engine
                    .update_section_settings(&id, settings_map([("title", "Bench")]))
                    .expect("update");
                engine
                    .add_block(SectionTarget::page(&id), "stat", Position::End)
                    .expect("block");
                let copy = engine.duplicate_section(&id).expect("duplicate");
                engine.move_section(&copy, 0).expect("move");
            }
            while engine.undo() {}
            while engine.redo() {}
            black_box(engine.page().len());
        });
    });
}

fn visibility_resolution(c: &mut Criterion) {
    let registry = registry();
    let schema = registry.get("featured_products").expect("schema").clone();
    let overrides = settings_map([
        ("product_source", SettingValue::text("collection")),
        ("show_view_all", SettingValue::Bool(false)),
    ]);
    c.bench_function("visibility_resolution", |b| {
        b.iter(|| black_box(visible_settings(black_box(&overrides), &schema.settings).len()));
    });
}

fn render_home_page(c: &mut Criterion) {
    let registry = registry();
    let page = home_page(&registry);
    let dispatch = RenderDispatch::new(Arc::clone(&registry), |ctx: &RenderContext<'_>| {
        ctx.visible.len() + ctx.blocks.len()
    });
    c.bench_function("render_home_page", |b| {
        b.iter(|| black_box(dispatch.render_page(black_box(&page)).expect("render").len()));
    });
}

criterion_group!(
    benches,
    engine_edit_script,
    visibility_resolution,
    render_home_page
);
criterion_main!(benches);
