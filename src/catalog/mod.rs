//! Built-in section catalogue and the documents a new store starts with.

mod sections;

use crate::document::{
    GlobalDocument, GlobalSlot, IdGenerator, PageDocument, SectionInstance, instantiate,
};
use crate::error::{BuilderError, Result};
use crate::registry::{SchemaError, SchemaRegistry};
use crate::schema::SectionSchema;
use crate::settings::{SettingValue, settings_map};

pub use sections::{
    announcement, categories, featured_products, footer, header, hero, newsletter,
};

/// Sections a fresh home page is built from, top to bottom.
pub const HOME_SECTIONS: [&str; 5] = [
    "announcement",
    "hero",
    "categories",
    "featured_products",
    "newsletter",
];

pub const HOME_PAGE: &str = "home";

/// Every stock schema in catalogue order.
pub fn builtin_schemas() -> Vec<SectionSchema> {
    sections::all()
}

impl SchemaRegistry {
    pub fn with_catalog() -> std::result::Result<Self, SchemaError> {
        SchemaRegistry::from_schemas(builtin_schemas())
    }
}

/// Home page made of each [`HOME_SECTIONS`] entry instantiated from its first
/// preset, plus the default page settings.
pub fn default_home_page(registry: &SchemaRegistry, ids: &mut dyn IdGenerator) -> Result<PageDocument> {
    let mut page = PageDocument::new();
    for type_id in HOME_SECTIONS {
        let schema = registry
            .get(type_id)
            .ok_or_else(|| BuilderError::UnknownType(type_id.to_string()))?;
        let preset = (!schema.presets.is_empty()).then_some(0);
        page.sections.push(instantiate(schema, preset, ids)?);
    }
    page.page_settings = settings_map([
        ("templateName", SettingValue::text("Jupiter")),
        ("pageType", SettingValue::text(HOME_PAGE)),
        ("rtl", SettingValue::Bool(true)),
        ("fontFamily", SettingValue::text("Inter")),
        ("primaryColor", SettingValue::text("#3b82f6")),
        ("secondaryColor", SettingValue::text("#8b5cf6")),
    ]);
    Ok(page)
}

/// Starting instance for a global slot. The header carries the store name as
/// its logo text; the footer starts with no overrides.
pub fn default_global(
    slot: GlobalSlot,
    registry: &SchemaRegistry,
    ids: &mut dyn IdGenerator,
    store_name: Option<&str>,
) -> Result<SectionInstance> {
    let type_id = slot.as_str();
    let schema = registry
        .get(type_id)
        .ok_or_else(|| BuilderError::UnknownType(type_id.to_string()))?;
    let mut section = instantiate(schema, None, ids)?;
    if slot == GlobalSlot::Header {
        section.settings = settings_map([
            ("header_design", SettingValue::text("logo-center-menu-left")),
            ("container", SettingValue::text("container-fluid")),
            ("header_sticky", SettingValue::Bool(true)),
            ("transparent_on_top", SettingValue::Bool(false)),
            ("logo_text", SettingValue::text(store_name.unwrap_or("My Store"))),
            ("search", SettingValue::text("hide")),
        ]);
    }
    Ok(section)
}

pub fn default_globals(
    registry: &SchemaRegistry,
    ids: &mut dyn IdGenerator,
    store_name: Option<&str>,
) -> Result<GlobalDocument> {
    let mut globals = GlobalDocument::new();
    for slot in GlobalSlot::ALL {
        let section = default_global(slot, registry, ids, store_name)?;
        globals.set(slot, Some(section));
    }
    Ok(globals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::visible_section_settings;
    use crate::document::{SequentialIds, validate_section};
    use crate::schema::SectionCategory;

    #[test]
    fn catalogue_passes_registration() {
        let registry = SchemaRegistry::with_catalog().unwrap();
        assert_eq!(registry.len(), 7);
        let headers: Vec<_> = registry
            .list_by_category(SectionCategory::Header)
            .into_iter()
            .map(|schema| schema.type_id.as_str())
            .collect();
        assert_eq!(headers, vec!["header", "announcement"]);
        assert_eq!(registry.get("hero").and_then(|s| s.max_blocks), Some(4));
    }

    #[test]
    fn home_page_is_valid_against_the_catalogue() {
        let registry = SchemaRegistry::with_catalog().unwrap();
        let mut ids = SequentialIds::new();
        let page = default_home_page(&registry, &mut ids).unwrap();

        let types: Vec<_> = page.sections.iter().map(|s| s.type_id.as_str()).collect();
        assert_eq!(types, HOME_SECTIONS.to_vec());
        assert_eq!(page.sections[1].blocks.len(), 3);
        assert_eq!(page.sections[2].blocks.len(), 4);
        assert_eq!(
            page.page_settings.get("pageType"),
            Some(&SettingValue::text("home"))
        );
        for section in &page.sections {
            let schema = registry.get(&section.type_id).unwrap();
            validate_section(section, schema).unwrap();
        }
    }

    #[test]
    fn default_header_uses_store_name() {
        let registry = SchemaRegistry::with_catalog().unwrap();
        let mut ids = SequentialIds::new();
        let globals = default_globals(&registry, &mut ids, Some("Acme")).unwrap();

        let header = globals.header.as_ref().unwrap();
        assert_eq!(header.settings.get("logo_text"), Some(&SettingValue::text("Acme")));
        validate_section(header, registry.get("header").unwrap()).unwrap();
        assert!(globals.footer.as_ref().unwrap().settings.is_empty());
    }

    #[test]
    fn view_all_fields_follow_the_toggle() {
        let registry = SchemaRegistry::with_catalog().unwrap();
        let schema = registry.get("featured_products").unwrap();
        let mut section = SectionInstance::new("fp", "featured_products");

        let visible: Vec<_> = visible_section_settings(&section, schema)
            .into_iter()
            .filter(|d| d.carries_value())
            .map(|d| d.id.as_str())
            .collect();
        assert!(visible.contains(&"view_all_text"));
        assert!(!visible.contains(&"collection"));

        section.settings.insert("show_view_all".into(), false.into());
        section.settings.insert("product_source".into(), "collection".into());
        let visible: Vec<_> = visible_section_settings(&section, schema)
            .into_iter()
            .map(|d| d.id.as_str())
            .collect();
        assert!(!visible.contains(&"view_all_text"));
        assert!(!visible.contains(&"view_all_link"));
        assert!(visible.contains(&"collection"));
    }
}
