use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::schema::{SectionCategory, SectionSchema};
use crate::settings::{SettingDescriptor, SettingsMap, ValueError};

/// Malformed schema declarations, caught when the schema is registered.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("section type id must not be empty")]
    EmptyTypeId,
    #[error("section type `{0}` is already registered")]
    DuplicateTypeId(String),
    #[error("`{owner}` declares block type `{block}` twice")]
    DuplicateBlockType { owner: String, block: String },
    #[error("`{owner}` has a `{kind}` setting at position {index} without an id")]
    MissingSettingId {
        owner: String,
        index: usize,
        kind: String,
    },
    #[error("`{owner}` declares setting `{setting}` twice")]
    DuplicateSettingId { owner: String, setting: String },
    #[error("`{owner}.{setting}` has an invalid default: {reason}")]
    InvalidDefault {
        owner: String,
        setting: String,
        reason: ValueError,
    },
    #[error("`{owner}.{setting}` has min greater than max")]
    InvertedRange { owner: String, setting: String },
    #[error("`{owner}.{setting}` offers no options")]
    MissingOptions { owner: String, setting: String },
    #[error("`{owner}.{setting}` is conditional on undeclared setting `{target}`")]
    UnknownConditionTarget {
        owner: String,
        setting: String,
        target: String,
    },
    #[error("`{owner}.{setting}` is conditional on `{target}`, which is declared after it")]
    ForwardConditionReference {
        owner: String,
        setting: String,
        target: String,
    },
    #[error("`{owner}` preset `{preset}` sets undeclared setting `{setting}`")]
    PresetUnknownSetting {
        owner: String,
        preset: String,
        setting: String,
    },
    #[error("`{owner}` preset `{preset}` has an invalid value for `{setting}`: {reason}")]
    PresetInvalidValue {
        owner: String,
        preset: String,
        setting: String,
        reason: ValueError,
    },
    #[error("`{owner}` preset `{preset}` uses undeclared block type `{block}`")]
    PresetUnknownBlockType {
        owner: String,
        preset: String,
        block: String,
    },
    #[error("`{owner}` preset `{preset}` seeds {count} blocks but the limit is {max}")]
    PresetExceedsMaxBlocks {
        owner: String,
        preset: String,
        count: usize,
        max: usize,
    },
}

/// Lookup table from section type id to schema.
///
/// Populated once at startup, then shared read-only (usually behind an `Arc`)
/// with the engine and the renderer dispatch.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    schemas: Vec<SectionSchema>,
    index: HashMap<String, usize>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of schemas, failing on the first invalid one.
    pub fn from_schemas<I>(schemas: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = SectionSchema>,
    {
        let mut registry = Self::new();
        for schema in schemas {
            registry.register(schema)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, schema: SectionSchema) -> Result<(), SchemaError> {
        if schema.type_id.is_empty() {
            return Err(SchemaError::EmptyTypeId);
        }
        if self.index.contains_key(&schema.type_id) {
            return Err(SchemaError::DuplicateTypeId(schema.type_id));
        }
        validate_schema(&schema)?;
        self.index.insert(schema.type_id.clone(), self.schemas.len());
        self.schemas.push(schema);
        Ok(())
    }

    pub fn get(&self, type_id: &str) -> Option<&SectionSchema> {
        self.index.get(type_id).map(|&idx| &self.schemas[idx])
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.index.contains_key(type_id)
    }

    /// Schemas of one category, in registration order.
    pub fn list_by_category(&self, category: SectionCategory) -> Vec<&SectionSchema> {
        self.schemas
            .iter()
            .filter(|schema| schema.category == category)
            .collect()
    }

    /// All schemas in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &SectionSchema> {
        self.schemas.iter()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

fn validate_schema(schema: &SectionSchema) -> Result<(), SchemaError> {
    let owner = schema.type_id.as_str();
    validate_settings(owner, &schema.settings)?;

    let mut block_types = HashSet::new();
    for block in &schema.block_types {
        if !block_types.insert(block.type_id.as_str()) {
            return Err(SchemaError::DuplicateBlockType {
                owner: owner.to_string(),
                block: block.type_id.clone(),
            });
        }
        validate_settings(&format!("{owner}/{}", block.type_id), &block.settings)?;
    }

    for preset in &schema.presets {
        check_preset_values(owner, &preset.name, &schema.settings, &preset.settings)?;
        if let Some(max) = schema.max_blocks {
            if preset.blocks.len() > max {
                return Err(SchemaError::PresetExceedsMaxBlocks {
                    owner: owner.to_string(),
                    preset: preset.name.clone(),
                    count: preset.blocks.len(),
                    max,
                });
            }
        }
        for block in &preset.blocks {
            let block_schema = schema.find_block_type(&block.type_id).ok_or_else(|| {
                SchemaError::PresetUnknownBlockType {
                    owner: owner.to_string(),
                    preset: preset.name.clone(),
                    block: block.type_id.clone(),
                }
            })?;
            check_preset_values(
                &format!("{owner}/{}", block.type_id),
                &preset.name,
                &block_schema.settings,
                &block.settings,
            )?;
        }
    }
    Ok(())
}

/// Checks one flat setting list: ids, defaults, ranges, options, and that
/// every conditional rule points at an earlier value-bearing sibling.
fn validate_settings(owner: &str, settings: &[SettingDescriptor]) -> Result<(), SchemaError> {
    let mut declared: HashSet<&str> = HashSet::new();

    for (index, descriptor) in settings.iter().enumerate() {
        if let Some(condition) = &descriptor.conditional {
            let setting = if descriptor.id.is_empty() {
                descriptor.label.as_str()
            } else {
                descriptor.id.as_str()
            };
            check_condition_target(owner, settings, &declared, index, setting, &condition.setting)?;
        }
        if !descriptor.carries_value() {
            continue;
        }
        let setting = descriptor.id.as_str();
        if setting.is_empty() {
            return Err(SchemaError::MissingSettingId {
                owner: owner.to_string(),
                index,
                kind: descriptor.kind.to_string(),
            });
        }
        if declared.contains(setting) {
            return Err(SchemaError::DuplicateSettingId {
                owner: owner.to_string(),
                setting: setting.to_string(),
            });
        }

        if let (Some(min), Some(max)) = (descriptor.min, descriptor.max) {
            if min > max {
                return Err(SchemaError::InvertedRange {
                    owner: owner.to_string(),
                    setting: setting.to_string(),
                });
            }
        }
        if descriptor.kind.uses_options() && descriptor.options.is_empty() {
            return Err(SchemaError::MissingOptions {
                owner: owner.to_string(),
                setting: setting.to_string(),
            });
        }
        if let Some(default) = &descriptor.default {
            descriptor
                .check_value(default)
                .map_err(|reason| SchemaError::InvalidDefault {
                    owner: owner.to_string(),
                    setting: setting.to_string(),
                    reason,
                })?;
        }

        declared.insert(setting);
    }
    Ok(())
}

/// Conditions may only point at a value-bearing setting declared earlier.
fn check_condition_target(
    owner: &str,
    settings: &[SettingDescriptor],
    declared: &HashSet<&str>,
    index: usize,
    setting: &str,
    target: &str,
) -> Result<(), SchemaError> {
    if declared.contains(target) {
        return Ok(());
    }
    let declared_later = settings[index..]
        .iter()
        .any(|other| other.carries_value() && other.id == target);
    let err = if declared_later {
        SchemaError::ForwardConditionReference {
            owner: owner.to_string(),
            setting: setting.to_string(),
            target: target.to_string(),
        }
    } else {
        SchemaError::UnknownConditionTarget {
            owner: owner.to_string(),
            setting: setting.to_string(),
            target: target.to_string(),
        }
    };
    Err(err)
}

fn check_preset_values(
    owner: &str,
    preset: &str,
    settings: &[SettingDescriptor],
    values: &SettingsMap,
) -> Result<(), SchemaError> {
    for (setting, value) in values {
        let descriptor = settings
            .iter()
            .find(|d| d.carries_value() && &d.id == setting)
            .ok_or_else(|| SchemaError::PresetUnknownSetting {
                owner: owner.to_string(),
                preset: preset.to_string(),
                setting: setting.clone(),
            })?;
        descriptor
            .check_value(value)
            .map_err(|reason| SchemaError::PresetInvalidValue {
                owner: owner.to_string(),
                preset: preset.to_string(),
                setting: setting.clone(),
                reason,
            })?;
    }
    Ok(())
}
