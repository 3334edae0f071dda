use thiserror::Error;

use crate::document::GlobalSlot;
use crate::persistence::PersistenceError;
use crate::registry::SchemaError;
use crate::settings::ValueError;

/// Unified result type for the builder crate.
pub type Result<T> = std::result::Result<T, BuilderError>;

/// Errors surfaced by the content model and the builder engine.
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("section type `{0}` is not registered")]
    UnknownType(String),
    #[error("section type `{section_type}` declares no block type `{block_type}`")]
    UnknownBlockType {
        section_type: String,
        block_type: String,
    },
    #[error("setting `{setting}` is not declared by `{owner}`")]
    UnknownSetting { owner: String, setting: String },
    #[error("`{0}` not found")]
    NotFound(String),
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("section `{section}` already holds the maximum of {max} blocks")]
    MaxBlocksExceeded { section: String, max: usize },
    #[error("invalid value for `{owner}.{setting}`: {source}")]
    InvalidValue {
        owner: String,
        setting: String,
        #[source]
        source: ValueError,
    },
    #[error("section type `{type_id}` has no preset at index {index}")]
    PresetOutOfRange { type_id: String, index: usize },
    #[error("global slot `{0}` holds no section")]
    GlobalSlotEmpty(GlobalSlot),
    #[error("document has not finished loading")]
    NotLoaded,
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl BuilderError {
    /// Caller misuse of the engine API. These indicate a bug in the editing
    /// surface rather than a condition the user can fix.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            BuilderError::UnknownType(_)
                | BuilderError::UnknownBlockType { .. }
                | BuilderError::UnknownSetting { .. }
                | BuilderError::NotFound(_)
                | BuilderError::IndexOutOfRange { .. }
                | BuilderError::MaxBlocksExceeded { .. }
                | BuilderError::PresetOutOfRange { .. }
                | BuilderError::GlobalSlotEmpty(_)
                | BuilderError::NotLoaded
        )
    }

    /// Failures at the persistence boundary; the in-memory document survives
    /// them and the operation can be retried.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BuilderError::Persistence(_))
    }

    /// Short machine-friendly label used in log fields and audit records.
    pub fn kind(&self) -> &'static str {
        match self {
            BuilderError::Schema(_) => "schema",
            BuilderError::UnknownType(_) => "unknown_type",
            BuilderError::UnknownBlockType { .. } => "unknown_block_type",
            BuilderError::UnknownSetting { .. } => "unknown_setting",
            BuilderError::NotFound(_) => "not_found",
            BuilderError::IndexOutOfRange { .. } => "index_out_of_range",
            BuilderError::MaxBlocksExceeded { .. } => "max_blocks_exceeded",
            BuilderError::InvalidValue { .. } => "invalid_value",
            BuilderError::PresetOutOfRange { .. } => "preset_out_of_range",
            BuilderError::GlobalSlotEmpty(_) => "global_slot_empty",
            BuilderError::NotLoaded => "not_loaded",
            BuilderError::Persistence(_) => "persistence",
        }
    }
}
