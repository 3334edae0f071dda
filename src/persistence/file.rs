use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::document::{GlobalSlot, PageDocument, SectionInstance};

use super::{DocumentStore, PersistenceResult, check_key};

/// One pretty-printed JSON file per document:
/// `{root}/{store}/pages/{page}.json` and `{root}/{store}/global/{slot}.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn page_path(&self, store_id: &str, page_key: &str) -> PersistenceResult<PathBuf> {
        check_key(store_id)?;
        check_key(page_key)?;
        Ok(self
            .root
            .join(store_id)
            .join("pages")
            .join(format!("{page_key}.json")))
    }

    pub fn global_path(&self, store_id: &str, slot: GlobalSlot) -> PersistenceResult<PathBuf> {
        check_key(store_id)?;
        Ok(self
            .root
            .join(store_id)
            .join("global")
            .join(format!("{slot}.json")))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> PersistenceResult<Option<T>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Write through a sibling temp file so readers never see half a document.
fn write_json<T: Serialize>(path: &Path, value: &T) -> PersistenceResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

impl DocumentStore for FileStore {
    fn load_page(&self, store_id: &str, page_key: &str) -> PersistenceResult<Option<PageDocument>> {
        read_json(&self.page_path(store_id, page_key)?)
    }

    fn save_page(&self, store_id: &str, page_key: &str, page: &PageDocument) -> PersistenceResult<()> {
        write_json(&self.page_path(store_id, page_key)?, page)
    }

    fn delete_page(&self, store_id: &str, page_key: &str) -> PersistenceResult<()> {
        match fs::remove_file(self.page_path(store_id, page_key)?) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }

    fn load_global(&self, store_id: &str, slot: GlobalSlot) -> PersistenceResult<Option<SectionInstance>> {
        read_json(&self.global_path(store_id, slot)?)
    }

    fn save_global(
        &self,
        store_id: &str,
        slot: GlobalSlot,
        section: &SectionInstance,
    ) -> PersistenceResult<()> {
        write_json(&self.global_path(store_id, slot)?, section)
    }
}
