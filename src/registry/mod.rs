//! Section schema registry.

mod core;

pub use self::core::{SchemaError, SchemaRegistry};
