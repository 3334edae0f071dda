//! Document mutations as data.
//!
//! Each [`Command`] turns one workspace snapshot into the next. Application
//! works on a copy, so a failure leaves the input untouched.

use std::collections::HashSet;

use crate::document::{
    BlockInstance, GlobalSlot, IdGenerator, PageDocument, SectionInstance, check_overrides,
    instantiate,
};
use crate::error::{BuilderError, Result};
use crate::registry::SchemaRegistry;
use crate::reorder::reorder_in_place;
use crate::schema::SectionSchema;
use crate::settings::SettingsMap;

use super::Workspace;

/// Insertion point for sections and blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    End,
    /// Insert before the element currently at this index (`0..=len`).
    At(usize),
}

impl Position {
    fn resolve(self, len: usize) -> Result<usize> {
        match self {
            Position::End => Ok(len),
            Position::At(index) if index <= len => Ok(index),
            Position::At(index) => Err(BuilderError::IndexOutOfRange { index, len }),
        }
    }
}

/// Addresses a section on the page or in a global slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionTarget {
    Page(String),
    Global(GlobalSlot),
}

impl SectionTarget {
    pub fn page(section_id: impl Into<String>) -> Self {
        SectionTarget::Page(section_id.into())
    }

    pub fn label(&self) -> String {
        match self {
            SectionTarget::Page(id) => id.clone(),
            SectionTarget::Global(slot) => format!("global:{slot}"),
        }
    }
}

impl From<GlobalSlot> for SectionTarget {
    fn from(slot: GlobalSlot) -> Self {
        SectionTarget::Global(slot)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddSection {
        type_id: String,
        preset: Option<usize>,
        position: Position,
    },
    RemoveSection {
        section_id: String,
    },
    DuplicateSection {
        section_id: String,
    },
    MoveSection {
        section_id: String,
        to_index: usize,
    },
    UpdateSettings {
        target: SectionTarget,
        partial: SettingsMap,
    },
    ResetSettings {
        target: SectionTarget,
        keys: Vec<String>,
    },
    SetHidden {
        target: SectionTarget,
        hidden: bool,
    },
    AddBlock {
        target: SectionTarget,
        block_type: String,
        position: Position,
    },
    RemoveBlock {
        target: SectionTarget,
        block_id: String,
    },
    UpdateBlockSettings {
        target: SectionTarget,
        block_id: String,
        partial: SettingsMap,
    },
    MoveBlock {
        target: SectionTarget,
        block_id: String,
        to_index: usize,
    },
    UpdatePageSettings {
        partial: SettingsMap,
    },
    InstallGlobal {
        slot: GlobalSlot,
        type_id: String,
        preset: Option<usize>,
    },
    ReplacePage {
        page: PageDocument,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddSection { .. } => "add_section",
            Command::RemoveSection { .. } => "remove_section",
            Command::DuplicateSection { .. } => "duplicate_section",
            Command::MoveSection { .. } => "move_section",
            Command::UpdateSettings { .. } => "update_settings",
            Command::ResetSettings { .. } => "reset_settings",
            Command::SetHidden { .. } => "set_hidden",
            Command::AddBlock { .. } => "add_block",
            Command::RemoveBlock { .. } => "remove_block",
            Command::UpdateBlockSettings { .. } => "update_block_settings",
            Command::MoveBlock { .. } => "move_block",
            Command::UpdatePageSettings { .. } => "update_page_settings",
            Command::InstallGlobal { .. } => "install_global",
            Command::ReplacePage { .. } => "replace_page",
        }
    }

    /// Compute the snapshot that follows `current`.
    pub fn apply(&self, current: &Workspace, ctx: &mut CommandContext<'_>) -> Result<Workspace> {
        let mut next = current.clone();
        match self {
            Command::AddSection {
                type_id,
                preset,
                position,
            } => {
                let schema = ctx.schema(type_id)?;
                let index = position.resolve(next.page.len())?;
                let section = instantiate(schema, *preset, &mut *ctx)?;
                next.page.sections.insert(index, section);
            }
            Command::RemoveSection { section_id } => {
                let index = page_position(&next.page, section_id)?;
                next.page.sections.remove(index);
            }
            Command::DuplicateSection { section_id } => {
                let index = page_position(&next.page, section_id)?;
                let copy = duplicate(&next.page.sections[index], &mut *ctx);
                next.page.sections.insert(index + 1, copy);
            }
            Command::MoveSection {
                section_id,
                to_index,
            } => {
                let from = page_position(&next.page, section_id)?;
                reorder_in_place(&mut next.page.sections, from, *to_index)?;
            }
            Command::UpdateSettings { target, partial } => {
                let section = next.section_mut(target)?;
                let schema = ctx.schema(&section.type_id)?;
                check_overrides(&schema.type_id, &schema.settings, partial)?;
                merge(&mut section.settings, partial);
            }
            Command::ResetSettings { target, keys } => {
                let section = next.section_mut(target)?;
                let schema = ctx.schema(&section.type_id)?;
                for key in keys {
                    if schema.find_setting(key).is_none() {
                        return Err(BuilderError::UnknownSetting {
                            owner: schema.type_id.clone(),
                            setting: key.clone(),
                        });
                    }
                    section.settings.remove(key);
                }
            }
            Command::SetHidden { target, hidden } => {
                next.section_mut(target)?.hidden = *hidden;
            }
            Command::AddBlock {
                target,
                block_type,
                position,
            } => {
                let section = next.section_mut(target)?;
                let schema = ctx.schema(&section.type_id)?;
                if schema.find_block_type(block_type).is_none() {
                    return Err(BuilderError::UnknownBlockType {
                        section_type: schema.type_id.clone(),
                        block_type: block_type.clone(),
                    });
                }
                if let Some(max) = schema.max_blocks {
                    if section.blocks.len() >= max {
                        return Err(BuilderError::MaxBlocksExceeded {
                            section: section.id.clone(),
                            max,
                        });
                    }
                }
                let index = position.resolve(section.blocks.len())?;
                let block = BlockInstance::new(ctx.next_id(block_type), block_type.clone());
                section.blocks.insert(index, block);
            }
            Command::RemoveBlock { target, block_id } => {
                let section = next.section_mut(target)?;
                let index = block_position(section, block_id)?;
                section.blocks.remove(index);
            }
            Command::UpdateBlockSettings {
                target,
                block_id,
                partial,
            } => {
                let section = next.section_mut(target)?;
                let schema = ctx.schema(&section.type_id)?;
                let index = block_position(section, block_id)?;
                let block = &mut section.blocks[index];
                let block_schema = schema.find_block_type(&block.type_id).ok_or_else(|| {
                    BuilderError::UnknownBlockType {
                        section_type: schema.type_id.clone(),
                        block_type: block.type_id.clone(),
                    }
                })?;
                let owner = format!("{}/{}", schema.type_id, block_schema.type_id);
                check_overrides(&owner, &block_schema.settings, partial)?;
                merge(&mut block.settings, partial);
            }
            Command::MoveBlock {
                target,
                block_id,
                to_index,
            } => {
                let section = next.section_mut(target)?;
                let from = block_position(section, block_id)?;
                reorder_in_place(&mut section.blocks, from, *to_index)?;
            }
            Command::UpdatePageSettings { partial } => {
                merge(&mut next.page.page_settings, partial);
            }
            Command::InstallGlobal {
                slot,
                type_id,
                preset,
            } => {
                let schema = ctx.schema(type_id)?;
                let section = instantiate(schema, *preset, &mut *ctx)?;
                next.globals.set(*slot, Some(section));
            }
            Command::ReplacePage { page } => {
                ctx.mark_seen(page.ids());
                next.page = page.clone();
            }
        }
        Ok(next)
    }
}

fn merge(target: &mut SettingsMap, partial: &SettingsMap) {
    for (key, value) in partial {
        target.insert(key.clone(), value.clone());
    }
}

fn page_position(page: &PageDocument, section_id: &str) -> Result<usize> {
    page.position(section_id)
        .ok_or_else(|| BuilderError::NotFound(section_id.to_string()))
}

fn block_position(section: &SectionInstance, block_id: &str) -> Result<usize> {
    section
        .block_position(block_id)
        .ok_or_else(|| BuilderError::NotFound(block_id.to_string()))
}

fn duplicate(section: &SectionInstance, ids: &mut dyn IdGenerator) -> SectionInstance {
    let mut copy = section.clone();
    copy.id = ids.next_id(&copy.type_id);
    for block in &mut copy.blocks {
        block.id = ids.next_id(&block.type_id);
    }
    copy
}

/// What a command may consult while it runs: the registry and an id source
/// that never repeats an id already seen in the session.
pub struct CommandContext<'a> {
    registry: &'a SchemaRegistry,
    ids: &'a mut dyn IdGenerator,
    seen: &'a mut HashSet<String>,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        registry: &'a SchemaRegistry,
        ids: &'a mut dyn IdGenerator,
        seen: &'a mut HashSet<String>,
    ) -> Self {
        Self {
            registry,
            ids,
            seen,
        }
    }

    /// Record ids that arrived from outside so they are never handed out.
    pub fn mark_seen<'i>(&mut self, ids: impl IntoIterator<Item = &'i str>) {
        self.seen.extend(ids.into_iter().map(str::to_string));
    }

    fn schema(&self, type_id: &str) -> Result<&'a SectionSchema> {
        self.registry
            .get(type_id)
            .ok_or_else(|| BuilderError::UnknownType(type_id.to_string()))
    }
}

impl IdGenerator for CommandContext<'_> {
    fn next_id(&mut self, type_id: &str) -> String {
        loop {
            let id = self.ids.next_id(type_id);
            if self.seen.insert(id.clone()) {
                return id;
            }
        }
    }
}
