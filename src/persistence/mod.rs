//! Persistence boundary: where page and global documents are loaded from and
//! saved to. Documents travel as JSON trees.

mod file;
mod memory;

use thiserror::Error;

use crate::document::{GlobalSlot, PageDocument, SectionInstance};

pub use file::FileStore;
pub use memory::MemoryStore;

pub type PersistenceResult<T> = std::result::Result<T, PersistenceError>;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("store is offline")]
    Offline,
    #[error("invalid storage key `{0}`")]
    InvalidKey(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Storage for one tenant's documents, keyed by `(store_id, page_key)` for
/// pages and `(store_id, slot)` for globals.
///
/// Missing documents load as `Ok(None)`; the caller decides what a missing
/// document means.
pub trait DocumentStore: Send + Sync {
    fn load_page(&self, store_id: &str, page_key: &str) -> PersistenceResult<Option<PageDocument>>;

    fn save_page(&self, store_id: &str, page_key: &str, page: &PageDocument) -> PersistenceResult<()>;

    fn delete_page(&self, store_id: &str, page_key: &str) -> PersistenceResult<()>;

    fn load_global(&self, store_id: &str, slot: GlobalSlot) -> PersistenceResult<Option<SectionInstance>>;

    fn save_global(
        &self,
        store_id: &str,
        slot: GlobalSlot,
        section: &SectionInstance,
    ) -> PersistenceResult<()>;
}

/// Keys become path segments in [`FileStore`], so they must be plain names.
pub(crate) fn check_key(key: &str) -> PersistenceResult<()> {
    let plain = !key.is_empty()
        && key != "."
        && key != ".."
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if plain {
        Ok(())
    } else {
        Err(PersistenceError::InvalidKey(key.to_string()))
    }
}
