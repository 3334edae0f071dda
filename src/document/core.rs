use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BuilderError, Result};
use crate::schema::{BlockSchema, SectionSchema, find_value_setting};
use crate::settings::{SettingDescriptor, SettingValue, SettingsMap};

use super::ids::IdGenerator;

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// Concrete block inside a section. `settings` holds overrides only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockInstance {
    pub id: String,
    #[serde(rename = "type")]
    pub type_id: String,
    #[serde(default)]
    pub settings: SettingsMap,
}

impl BlockInstance {
    pub fn new(id: impl Into<String>, type_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_id: type_id.into(),
            settings: SettingsMap::new(),
        }
    }

    pub fn resolve<'a>(
        &'a self,
        schema: &'a BlockSchema,
        setting: &str,
    ) -> Result<Option<&'a SettingValue>> {
        resolve_in(&self.settings, &schema.settings, &schema.type_id, setting)
    }
}

/// Concrete occurrence of a section schema on a page or in a global slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionInstance {
    pub id: String,
    #[serde(rename = "type")]
    pub type_id: String,
    #[serde(default)]
    pub settings: SettingsMap,
    #[serde(default)]
    pub blocks: Vec<BlockInstance>,
    /// Hidden sections stay in the document but are not rendered.
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,
}

impl SectionInstance {
    pub fn new(id: impl Into<String>, type_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_id: type_id.into(),
            settings: SettingsMap::new(),
            blocks: Vec::new(),
            hidden: false,
        }
    }

    pub fn block(&self, block_id: &str) -> Option<&BlockInstance> {
        self.blocks.iter().find(|block| block.id == block_id)
    }

    pub fn block_position(&self, block_id: &str) -> Option<usize> {
        self.blocks.iter().position(|block| block.id == block_id)
    }

    /// Effective value of one setting; see [`resolve_setting`].
    pub fn resolve<'a>(
        &'a self,
        schema: &'a SectionSchema,
        setting: &str,
    ) -> Result<Option<&'a SettingValue>> {
        resolve_setting(self, schema, setting)
    }

    /// Section id followed by the ids of its blocks.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.id.as_str()).chain(self.blocks.iter().map(|block| block.id.as_str()))
    }
}

/// Ordered section list of one page plus its general settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageDocument {
    #[serde(default)]
    pub sections: Vec<SectionInstance>,
    #[serde(rename = "settings", alias = "pageSettings", default)]
    pub page_settings: SettingsMap,
}

impl PageDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self, section_id: &str) -> Option<usize> {
        self.sections.iter().position(|section| section.id == section_id)
    }

    pub fn section(&self, section_id: &str) -> Option<&SectionInstance> {
        self.sections.iter().find(|section| section.id == section_id)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Every section and block id in the document.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().flat_map(SectionInstance::ids)
    }
}

/// Fixed slot of a site-wide section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlobalSlot {
    Header,
    Footer,
}

impl GlobalSlot {
    pub const ALL: [GlobalSlot; 2] = [GlobalSlot::Header, GlobalSlot::Footer];

    pub fn as_str(&self) -> &'static str {
        match self {
            GlobalSlot::Header => "header",
            GlobalSlot::Footer => "footer",
        }
    }
}

impl fmt::Display for GlobalSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header and footer shared by every page of a store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalDocument {
    #[serde(default)]
    pub header: Option<SectionInstance>,
    #[serde(default)]
    pub footer: Option<SectionInstance>,
}

impl GlobalDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: GlobalSlot) -> Option<&SectionInstance> {
        match slot {
            GlobalSlot::Header => self.header.as_ref(),
            GlobalSlot::Footer => self.footer.as_ref(),
        }
    }

    pub fn get_mut(&mut self, slot: GlobalSlot) -> Option<&mut SectionInstance> {
        match slot {
            GlobalSlot::Header => self.header.as_mut(),
            GlobalSlot::Footer => self.footer.as_mut(),
        }
    }

    pub fn set(&mut self, slot: GlobalSlot, section: Option<SectionInstance>) {
        match slot {
            GlobalSlot::Header => self.header = section,
            GlobalSlot::Footer => self.footer = section,
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.header
            .iter()
            .chain(self.footer.iter())
            .flat_map(SectionInstance::ids)
    }
}

/// Create a section from a schema with a fresh id.
///
/// `preset` picks the preset whose settings and blocks seed the instance;
/// `None` leaves the override map empty so every default applies.
pub fn instantiate(
    schema: &SectionSchema,
    preset: Option<usize>,
    ids: &mut dyn IdGenerator,
) -> Result<SectionInstance> {
    let mut section = SectionInstance::new(ids.next_id(&schema.type_id), schema.type_id.clone());
    let Some(index) = preset else {
        return Ok(section);
    };
    let preset = schema
        .presets
        .get(index)
        .ok_or_else(|| BuilderError::PresetOutOfRange {
            type_id: schema.type_id.clone(),
            index,
        })?;
    section.settings = preset.settings.clone();
    section.blocks = preset
        .blocks
        .iter()
        .map(|block| BlockInstance {
            id: ids.next_id(&block.type_id),
            type_id: block.type_id.clone(),
            settings: block.settings.clone(),
        })
        .collect();
    Ok(section)
}

/// Effective value of `setting` on `section`: the override when present
/// (an explicit `Null` included), otherwise the schema default, otherwise
/// `None`, which renderers treat as "supply your own fallback".
///
/// Asking for a setting the schema does not declare is an error.
pub fn resolve_setting<'a>(
    section: &'a SectionInstance,
    schema: &'a SectionSchema,
    setting: &str,
) -> Result<Option<&'a SettingValue>> {
    resolve_in(&section.settings, &schema.settings, &schema.type_id, setting)
}

pub(crate) fn resolve_in<'a>(
    overrides: &'a SettingsMap,
    descriptors: &'a [SettingDescriptor],
    owner: &str,
    setting: &str,
) -> Result<Option<&'a SettingValue>> {
    let descriptor =
        find_value_setting(descriptors, setting).ok_or_else(|| BuilderError::UnknownSetting {
            owner: owner.to_string(),
            setting: setting.to_string(),
        })?;
    Ok(overrides.get(setting).or(descriptor.default.as_ref()))
}

/// Resolved map of every value-bearing setting that resolves to something.
pub fn effective_values(overrides: &SettingsMap, descriptors: &[SettingDescriptor]) -> SettingsMap {
    descriptors
        .iter()
        .filter(|descriptor| descriptor.carries_value())
        .filter_map(|descriptor| {
            overrides
                .get(&descriptor.id)
                .or(descriptor.default.as_ref())
                .map(|value| (descriptor.id.clone(), value.clone()))
        })
        .collect()
}

/// Check that every override is declared and accepted by its descriptor.
pub fn check_overrides(
    owner: &str,
    descriptors: &[SettingDescriptor],
    overrides: &SettingsMap,
) -> Result<()> {
    for (setting, value) in overrides {
        let descriptor =
            find_value_setting(descriptors, setting).ok_or_else(|| BuilderError::UnknownSetting {
                owner: owner.to_string(),
                setting: setting.clone(),
            })?;
        descriptor
            .check_value(value)
            .map_err(|source| BuilderError::InvalidValue {
                owner: owner.to_string(),
                setting: setting.clone(),
                source,
            })?;
    }
    Ok(())
}

/// Confirm a section matches its schema: declared settings with accepted
/// values, declared block types, and the block limit.
pub fn validate_section(section: &SectionInstance, schema: &SectionSchema) -> Result<()> {
    if section.type_id != schema.type_id {
        return Err(BuilderError::UnknownType(section.type_id.clone()));
    }
    check_overrides(&schema.type_id, &schema.settings, &section.settings)?;
    if let Some(max) = schema.max_blocks {
        if section.blocks.len() > max {
            return Err(BuilderError::MaxBlocksExceeded {
                section: section.id.clone(),
                max,
            });
        }
    }
    for block in &section.blocks {
        let block_schema = schema.find_block_type(&block.type_id).ok_or_else(|| {
            BuilderError::UnknownBlockType {
                section_type: schema.type_id.clone(),
                block_type: block.type_id.clone(),
            }
        })?;
        check_overrides(
            &format!("{}/{}", schema.type_id, block.type_id),
            &block_schema.settings,
            &block.settings,
        )?;
    }
    Ok(())
}
