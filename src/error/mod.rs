mod types;

pub use types::{BuilderError, Result};
