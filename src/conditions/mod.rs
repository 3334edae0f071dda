//! Conditional settings resolver.

mod core;

pub use self::core::{
    evaluate, group_settings, visible_block_settings, visible_section_settings, visible_settings,
};
