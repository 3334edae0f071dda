//! Content document model: page and global documents made of section and
//! block instances that store only their overrides.

mod core;
mod ids;
mod sanitize;

pub(crate) use self::core::resolve_in;
pub use self::core::{
    BlockInstance, GlobalDocument, GlobalSlot, PageDocument, SectionInstance, check_overrides,
    effective_values, instantiate, resolve_setting, validate_section,
};
pub use ids::{IdGenerator, SequentialIds, UuidIds};
pub use sanitize::{SanitizeReport, sanitize_page, sanitize_section};
