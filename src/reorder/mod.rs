//! Drag-reorder index remapping.

mod core;

pub use self::core::{drop_index, reorder, reorder_in_place};
