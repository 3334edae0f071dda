use std::fmt;

use serde::{Deserialize, Serialize};

use crate::settings::{SettingDescriptor, SettingsMap};

/// Browse category of a section in the section library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionCategory {
    Header,
    Hero,
    Products,
    Content,
    Marketing,
    Footer,
}

impl SectionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionCategory::Header => "header",
            SectionCategory::Hero => "hero",
            SectionCategory::Products => "products",
            SectionCategory::Content => "content",
            SectionCategory::Marketing => "marketing",
            SectionCategory::Footer => "footer",
        }
    }
}

impl fmt::Display for SectionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repeatable sub-item type a section accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSchema {
    #[serde(rename = "type")]
    pub type_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub settings: Vec<SettingDescriptor>,
}

impl BlockSchema {
    pub fn new(type_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            name: name.into(),
            settings: Vec::new(),
        }
    }

    pub fn setting(mut self, descriptor: SettingDescriptor) -> Self {
        self.settings.push(descriptor);
        self
    }

    pub fn find_setting(&self, id: &str) -> Option<&SettingDescriptor> {
        find_value_setting(&self.settings, id)
    }
}

/// Block seeded by a preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetBlock {
    #[serde(rename = "type")]
    pub type_id: String,
    #[serde(default)]
    pub settings: SettingsMap,
}

impl PresetBlock {
    pub fn new(type_id: impl Into<String>, settings: SettingsMap) -> Self {
        Self {
            type_id: type_id.into(),
            settings,
        }
    }
}

/// Named starting configuration bundled with a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub settings: SettingsMap,
    #[serde(default)]
    pub blocks: Vec<PresetBlock>,
}

impl Preset {
    pub fn new(name: impl Into<String>, settings: SettingsMap) -> Self {
        Self {
            name: name.into(),
            settings,
            blocks: Vec::new(),
        }
    }

    pub fn block(mut self, block: PresetBlock) -> Self {
        self.blocks.push(block);
        self
    }
}

/// Registered definition of a section type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSchema {
    #[serde(rename = "id")]
    pub type_id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    pub category: SectionCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub settings: Vec<SettingDescriptor>,
    #[serde(rename = "blocks", default)]
    pub block_types: Vec<BlockSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_blocks: Option<usize>,
    #[serde(default)]
    pub presets: Vec<Preset>,
}

impl SectionSchema {
    pub fn new(
        type_id: impl Into<String>,
        display_name: impl Into<String>,
        category: SectionCategory,
    ) -> Self {
        Self {
            type_id: type_id.into(),
            display_name: display_name.into(),
            category,
            description: None,
            settings: Vec::new(),
            block_types: Vec::new(),
            max_blocks: None,
            presets: Vec::new(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn setting(mut self, descriptor: SettingDescriptor) -> Self {
        self.settings.push(descriptor);
        self
    }

    pub fn block_type(mut self, block: BlockSchema) -> Self {
        self.block_types.push(block);
        self
    }

    pub fn max_blocks(mut self, max: usize) -> Self {
        self.max_blocks = Some(max);
        self
    }

    pub fn preset(mut self, preset: Preset) -> Self {
        self.presets.push(preset);
        self
    }

    /// Value-bearing descriptor with the given id.
    pub fn find_setting(&self, id: &str) -> Option<&SettingDescriptor> {
        find_value_setting(&self.settings, id)
    }

    pub fn find_block_type(&self, type_id: &str) -> Option<&BlockSchema> {
        self.block_types.iter().find(|block| block.type_id == type_id)
    }

    /// Whether `count` blocks fit under `max_blocks`.
    pub fn allows_blocks(&self, count: usize) -> bool {
        self.max_blocks.map(|max| count <= max).unwrap_or(true)
    }
}

pub(crate) fn find_value_setting<'a>(
    settings: &'a [SettingDescriptor],
    id: &str,
) -> Option<&'a SettingDescriptor> {
    settings
        .iter()
        .find(|descriptor| descriptor.carries_value() && descriptor.id == id)
}
