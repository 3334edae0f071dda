use std::collections::HashMap;
use std::sync::Arc;

use crate::conditions::visible_settings;
use crate::document::{
    BlockInstance, GlobalDocument, GlobalSlot, PageDocument, SectionInstance, effective_values,
    validate_section,
};
use crate::error::{BuilderError, Result};
use crate::registry::SchemaRegistry;
use crate::schema::{BlockSchema, SectionSchema};
use crate::settings::{SettingDescriptor, SettingValue, SettingsMap};

/// Block handed to a renderer with its values already resolved.
#[derive(Debug, Clone)]
pub struct ResolvedBlock<'a> {
    pub block: &'a BlockInstance,
    pub schema: &'a BlockSchema,
    pub visible: Vec<&'a SettingDescriptor>,
    pub values: SettingsMap,
}

impl ResolvedBlock<'_> {
    pub fn value(&self, id: &str) -> Option<&SettingValue> {
        self.values.get(id)
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.value(id).and_then(SettingValue::as_str)
    }
}

/// Everything a renderer may read about one validated section.
///
/// `values` maps every value-bearing setting that resolves to something;
/// settings without override or default are absent and the renderer picks its
/// own fallback.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    pub section: &'a SectionInstance,
    pub schema: &'a SectionSchema,
    pub visible: Vec<&'a SettingDescriptor>,
    pub values: SettingsMap,
    pub blocks: Vec<ResolvedBlock<'a>>,
    pub page_settings: Option<&'a SettingsMap>,
}

impl<'a> RenderContext<'a> {
    pub fn build(
        section: &'a SectionInstance,
        schema: &'a SectionSchema,
        page_settings: Option<&'a SettingsMap>,
    ) -> Result<Self> {
        let mut blocks = Vec::with_capacity(section.blocks.len());
        for block in &section.blocks {
            let block_schema = schema.find_block_type(&block.type_id).ok_or_else(|| {
                BuilderError::UnknownBlockType {
                    section_type: schema.type_id.clone(),
                    block_type: block.type_id.clone(),
                }
            })?;
            blocks.push(ResolvedBlock {
                block,
                schema: block_schema,
                visible: visible_settings(&block.settings, &block_schema.settings),
                values: effective_values(&block.settings, &block_schema.settings),
            });
        }
        Ok(Self {
            section,
            schema,
            visible: visible_settings(&section.settings, &schema.settings),
            values: effective_values(&section.settings, &schema.settings),
            blocks,
            page_settings,
        })
    }

    pub fn value(&self, id: &str) -> Option<&SettingValue> {
        self.values.get(id)
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.value(id).and_then(SettingValue::as_str)
    }

    pub fn flag(&self, id: &str) -> bool {
        self.value(id).and_then(SettingValue::as_bool).unwrap_or(false)
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.iter().any(|descriptor| descriptor.id == id)
    }
}

/// Produces the visual output of one section type.
pub trait SectionRenderer<O>: Send + Sync {
    fn render(&self, ctx: &RenderContext<'_>) -> O;
}

impl<O, F> SectionRenderer<O> for F
where
    F: Fn(&RenderContext<'_>) -> O + Send + Sync,
{
    fn render(&self, ctx: &RenderContext<'_>) -> O {
        self(ctx)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSection<O> {
    pub id: String,
    pub type_id: String,
    pub output: O,
}

/// Routes each section to the renderer registered for its type, falling back
/// to a catch-all renderer. Sections are validated before any renderer sees
/// them.
pub struct RenderDispatch<O> {
    registry: Arc<SchemaRegistry>,
    renderers: HashMap<String, Box<dyn SectionRenderer<O>>>,
    fallback: Box<dyn SectionRenderer<O>>,
}

impl<O> RenderDispatch<O> {
    pub fn new<F>(registry: Arc<SchemaRegistry>, fallback: F) -> Self
    where
        F: SectionRenderer<O> + 'static,
    {
        Self {
            registry,
            renderers: HashMap::new(),
            fallback: Box::new(fallback),
        }
    }

    pub fn register<R>(&mut self, type_id: impl Into<String>, renderer: R) -> &mut Self
    where
        R: SectionRenderer<O> + 'static,
    {
        self.renderers.insert(type_id.into(), Box::new(renderer));
        self
    }

    pub fn has_renderer(&self, type_id: &str) -> bool {
        self.renderers.contains_key(type_id)
    }

    /// Render one section regardless of its hidden flag.
    pub fn render_section(
        &self,
        section: &SectionInstance,
        page_settings: Option<&SettingsMap>,
    ) -> Result<RenderedSection<O>> {
        let schema = self
            .registry
            .get(&section.type_id)
            .ok_or_else(|| BuilderError::UnknownType(section.type_id.clone()))?;
        validate_section(section, schema)?;
        let ctx = RenderContext::build(section, schema, page_settings)?;
        let renderer = self
            .renderers
            .get(&section.type_id)
            .unwrap_or(&self.fallback);
        Ok(RenderedSection {
            id: section.id.clone(),
            type_id: section.type_id.clone(),
            output: renderer.render(&ctx),
        })
    }

    /// Render the visible sections of `page` in order. The first invalid
    /// section aborts the whole render.
    pub fn render_page(&self, page: &PageDocument) -> Result<Vec<RenderedSection<O>>> {
        page.sections
            .iter()
            .filter(|section| !section.hidden)
            .map(|section| self.render_section(section, Some(&page.page_settings)))
            .collect()
    }

    /// `None` when the slot is empty or its section is hidden.
    pub fn render_global(
        &self,
        globals: &GlobalDocument,
        slot: GlobalSlot,
    ) -> Result<Option<RenderedSection<O>>> {
        match globals.get(slot) {
            Some(section) if !section.hidden => self.render_section(section, None).map(Some),
            _ => Ok(None),
        }
    }
}
