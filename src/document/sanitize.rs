use crate::registry::SchemaRegistry;
use crate::schema::find_value_setting;
use crate::settings::{SettingDescriptor, SettingsMap};

use super::core::{PageDocument, SectionInstance};

/// What [`sanitize_page`] had to drop from a stored document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SanitizeReport {
    /// Ids of sections whose type is no longer registered.
    pub dropped_sections: Vec<String>,
    /// Ids of blocks with an undeclared type or beyond the block limit.
    pub dropped_blocks: Vec<String>,
    /// `{instance id}.{setting}` for undeclared keys and refused values.
    pub dropped_settings: Vec<String>,
}

impl SanitizeReport {
    pub fn is_clean(&self) -> bool {
        self.dropped_sections.is_empty()
            && self.dropped_blocks.is_empty()
            && self.dropped_settings.is_empty()
    }
}

/// Bring a stored page in line with the registry so the renderer never sees
/// an instance its schema does not describe.
pub fn sanitize_page(page: PageDocument, registry: &SchemaRegistry) -> (PageDocument, SanitizeReport) {
    let mut report = SanitizeReport::default();
    let sections = page
        .sections
        .into_iter()
        .filter_map(|section| {
            if registry.contains(&section.type_id) {
                Some(sanitize_section(section, registry, &mut report))
            } else {
                report.dropped_sections.push(section.id);
                None
            }
        })
        .collect();
    let page = PageDocument {
        sections,
        page_settings: page.page_settings,
    };
    (page, report)
}

/// Same as [`sanitize_page`] for a single section. Sections of unknown
/// types come back unchanged; callers check the registry first.
pub fn sanitize_section(
    mut section: SectionInstance,
    registry: &SchemaRegistry,
    report: &mut SanitizeReport,
) -> SectionInstance {
    let Some(schema) = registry.get(&section.type_id) else {
        return section;
    };
    retain_valid(&section.id, &mut section.settings, &schema.settings, report);

    let max = schema.max_blocks.unwrap_or(usize::MAX);
    let mut kept = Vec::with_capacity(section.blocks.len());
    for mut block in std::mem::take(&mut section.blocks) {
        let Some(block_schema) = schema.find_block_type(&block.type_id) else {
            report.dropped_blocks.push(block.id);
            continue;
        };
        if kept.len() >= max {
            report.dropped_blocks.push(block.id);
            continue;
        }
        retain_valid(&block.id, &mut block.settings, &block_schema.settings, report);
        kept.push(block);
    }
    section.blocks = kept;
    section
}

fn retain_valid(
    owner_id: &str,
    settings: &mut SettingsMap,
    descriptors: &[SettingDescriptor],
    report: &mut SanitizeReport,
) {
    settings.retain(|key, value| {
        let keep = find_value_setting(descriptors, key)
            .map(|descriptor| descriptor.check_value(value).is_ok())
            .unwrap_or(false);
        if !keep {
            report.dropped_settings.push(format!("{owner_id}.{key}"));
        }
        keep
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::BlockInstance;
    use crate::schema::{BlockSchema, SectionCategory, SectionSchema};
    use crate::settings::{SettingKind, SettingValue};

    fn registry() -> SchemaRegistry {
        SchemaRegistry::from_schemas([SectionSchema::new("hero", "Hero", SectionCategory::Hero)
            .setting(SettingDescriptor::new(SettingKind::Text, "title", "Title"))
            .setting(SettingDescriptor::new(SettingKind::Checkbox, "sticky", "Sticky"))
            .block_type(BlockSchema::new("stat", "Stat"))
            .max_blocks(1)])
        .unwrap()
    }

    #[test]
    fn clean_documents_pass_through() {
        let mut page = PageDocument::new();
        page.sections.push(SectionInstance::new("hero_1", "hero"));
        let (clean, report) = sanitize_page(page.clone(), &registry());
        assert!(report.is_clean());
        assert_eq!(clean, page);
    }

    #[test]
    fn drops_what_the_registry_does_not_describe() {
        let mut hero = SectionInstance::new("hero_1", "hero");
        hero.settings.insert("title".into(), "Hi".into());
        hero.settings.insert("legacy_flag".into(), true.into());
        hero.settings.insert("sticky".into(), SettingValue::text("yes"));
        hero.blocks.push(BlockInstance::new("stat_1", "stat"));
        hero.blocks.push(BlockInstance::new("stat_2", "stat"));
        hero.blocks.push(BlockInstance::new("slide_1", "slide"));

        let mut page = PageDocument::new();
        page.sections.push(SectionInstance::new("gallery_1", "gallery"));
        page.sections.push(hero);

        let (clean, report) = sanitize_page(page, &registry());
        assert_eq!(clean.sections.len(), 1);
        assert_eq!(clean.sections[0].blocks.len(), 1);
        assert_eq!(clean.sections[0].settings.len(), 1);
        assert_eq!(report.dropped_sections, vec!["gallery_1"]);
        assert_eq!(report.dropped_blocks, vec!["stat_2", "slide_1"]);
        assert_eq!(
            report.dropped_settings,
            vec!["hero_1.legacy_flag", "hero_1.sticky"]
        );
    }
}
