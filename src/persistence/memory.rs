use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::document::{GlobalSlot, PageDocument, SectionInstance};

use super::{DocumentStore, PersistenceError, PersistenceResult, check_key};

/// JSON strings kept in memory. Clones share contents and the offline switch,
/// so a test can keep a handle while a session owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    offline: Arc<AtomicBool>,
    writes: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every call fails with [`PersistenceError::Offline`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    /// Successful saves and deletes so far.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn contains_page(&self, store_id: &str, page_key: &str) -> bool {
        self.raw(&page_key_of(store_id, page_key)).is_some()
    }

    /// Stored JSON for a key such as `store/pages/home` or `store/global/header`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn ensure_online(&self) -> PersistenceResult<()> {
        if self.is_offline() {
            Err(PersistenceError::Offline)
        } else {
            Ok(())
        }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> PersistenceResult<Option<T>> {
        self.ensure_online()?;
        let entries = self.lock()?;
        entries
            .get(key)
            .map(|json| serde_json::from_str(json))
            .transpose()
            .map_err(PersistenceError::from)
    }

    fn write<T: Serialize>(&self, key: String, value: &T) -> PersistenceResult<()> {
        self.ensure_online()?;
        let json = serde_json::to_string(value)?;
        self.lock()?.insert(key, json);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| PersistenceError::Backend("memory store lock poisoned".to_string()))
    }
}

fn page_key_of(store_id: &str, page_key: &str) -> String {
    format!("{store_id}/pages/{page_key}")
}

fn global_key_of(store_id: &str, slot: GlobalSlot) -> String {
    format!("{store_id}/global/{slot}")
}

impl DocumentStore for MemoryStore {
    fn load_page(&self, store_id: &str, page_key: &str) -> PersistenceResult<Option<PageDocument>> {
        check_key(store_id)?;
        check_key(page_key)?;
        self.read(&page_key_of(store_id, page_key))
    }

    fn save_page(&self, store_id: &str, page_key: &str, page: &PageDocument) -> PersistenceResult<()> {
        check_key(store_id)?;
        check_key(page_key)?;
        self.write(page_key_of(store_id, page_key), page)
    }

    fn delete_page(&self, store_id: &str, page_key: &str) -> PersistenceResult<()> {
        check_key(store_id)?;
        check_key(page_key)?;
        self.ensure_online()?;
        self.lock()?.remove(&page_key_of(store_id, page_key));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load_global(&self, store_id: &str, slot: GlobalSlot) -> PersistenceResult<Option<SectionInstance>> {
        check_key(store_id)?;
        self.read(&global_key_of(store_id, slot))
    }

    fn save_global(
        &self,
        store_id: &str,
        slot: GlobalSlot,
        section: &SectionInstance,
    ) -> PersistenceResult<()> {
        check_key(store_id)?;
        self.write(global_key_of(store_id, slot), section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> PageDocument {
        let mut page = PageDocument::new();
        page.sections.push(SectionInstance::new("hero_1", "hero"));
        page
    }

    #[test]
    fn pages_round_trip_as_json() {
        let store = MemoryStore::new();
        assert!(store.load_page("acme", "home").unwrap().is_none());
        store.save_page("acme", "home", &page()).unwrap();
        assert_eq!(store.load_page("acme", "home").unwrap(), Some(page()));
        assert!(store.raw("acme/pages/home").unwrap().contains("\"type\":\"hero\""));

        store.delete_page("acme", "home").unwrap();
        assert!(!store.contains_page("acme", "home"));
        assert_eq!(store.writes(), 2);
    }

    #[test]
    fn globals_are_keyed_by_slot() {
        let store = MemoryStore::new();
        let header = SectionInstance::new("header_1", "header");
        store.save_global("acme", GlobalSlot::Header, &header).unwrap();
        assert_eq!(store.load_global("acme", GlobalSlot::Header).unwrap(), Some(header));
        assert!(store.load_global("acme", GlobalSlot::Footer).unwrap().is_none());
        assert!(store.load_global("other", GlobalSlot::Header).unwrap().is_none());
    }

    #[test]
    fn offline_switch_is_shared_between_clones() {
        let store = MemoryStore::new();
        let handle = store.clone();
        handle.set_offline(true);
        assert!(matches!(
            store.save_page("acme", "home", &page()),
            Err(PersistenceError::Offline)
        ));
        assert!(matches!(
            store.load_page("acme", "home"),
            Err(PersistenceError::Offline)
        ));
        handle.set_offline(false);
        store.save_page("acme", "home", &page()).unwrap();
        assert!(handle.contains_page("acme", "home"));
    }
}
