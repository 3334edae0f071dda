//! Section and block schema declarations.

mod core;

pub(crate) use self::core::find_value_setting;
pub use self::core::{BlockSchema, Preset, PresetBlock, SectionCategory, SectionSchema};
