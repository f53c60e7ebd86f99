//! Persistent key-value layer.
//!
//! Every durable entity the engine owns — the personas list, the per-user
//! raw logs, the per-persona vector stores — is serialized to JSON and saved
//! under a deterministic key through the [`Store`] trait. Production uses
//! [`SqliteStore`]; tests inject [`MemStore`], which can share one map across
//! two engine instances to simulate a process restart.

pub mod sqlite;

use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub use sqlite::SqliteStore;

/// Key under which the family-member list is persisted.
pub const PERSONAS_KEY: &str = "personas";

/// Key for a user's raw conversation log.
pub fn memory_log_key(user_id: &str) -> String {
    format!("memlog:{user_id}")
}

/// Key for a family member's vector store.
pub fn vector_store_key(family_member_id: &str) -> String {
    format!("vectorstore:{family_member_id}")
}

/// Durable string-to-string storage.
///
/// Individual `get`/`set`/`remove` calls are atomic, but there is no
/// cross-key transaction: a log append and a vector-store append are two
/// independent writes.
pub trait Store: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory store backed by a shared map.
///
/// Cloning yields a handle onto the same map, so a test can hand one clone
/// to a first engine, drop that engine, and build a second engine on another
/// clone to exercise the reload path.
#[derive(Clone, Default)]
pub struct MemStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("store mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Store for MemStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().expect("store mutex poisoned");
        Ok(entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_naming_is_stable() {
        assert_eq!(memory_log_key("alice"), "memlog:alice");
        assert_eq!(vector_store_key("default"), "vectorstore:default");
        assert_eq!(PERSONAS_KEY, "personas");
    }

    #[test]
    fn mem_store_round_trip() {
        let mut store = MemStore::new();
        assert_eq!(store.get("missing").unwrap(), None);

        store.set("k", "v1").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v1"));

        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));

        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn clones_share_state() {
        let mut store = MemStore::new();
        let reader = store.clone();

        store.set("shared", "value").unwrap();
        assert_eq!(reader.get("shared").unwrap().as_deref(), Some("value"));
    }
}
