//! 인메모리 키-값 저장소.
//!
//! 테스트와 영속 저장소가 없는 환경을 위한 `KeyValueStore` 구현,
//! 그리고 저장소가 차단된 환경(시크릿 모드 등)을 흉내내는 `BlockedStore`.

use academy_core::error::CoreError;
use academy_core::ports::storage::KeyValueStore;
use parking_lot::Mutex;
use std::collections::HashMap;

/// HashMap 기반 키-값 저장소
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 초기 값이 채워진 저장소
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(map),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// 모든 연산이 `StorageUnavailable`로 실패하는 저장소
#[derive(Debug, Default, Clone, Copy)]
pub struct BlockedStore;

impl KeyValueStore for BlockedStore {
    fn get(&self, _key: &str) -> Result<Option<String>, CoreError> {
        Err(CoreError::StorageUnavailable)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), CoreError> {
        Err(CoreError::StorageUnavailable)
    }

    fn remove(&self, _key: &str) -> Result<(), CoreError> {
        Err(CoreError::StorageUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::ports::storage::{flag_enabled, MAINTENANCE_MODE_KEY};

    #[test]
    fn set_get_remove() {
        let store = MemoryStore::new();
        store.set("session_id", "abc").unwrap();
        assert_eq!(store.get("session_id").unwrap().as_deref(), Some("abc"));

        store.set("session_id", "def").unwrap();
        assert_eq!(store.get("session_id").unwrap().as_deref(), Some("def"));
        assert_eq!(store.len(), 1);

        store.remove("session_id").unwrap();
        assert!(store.get("session_id").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn blocked_store_fails_every_call() {
        let store = BlockedStore;
        assert!(matches!(store.get("k"), Err(CoreError::StorageUnavailable)));
        assert!(store.set("k", "v").is_err());
        assert!(store.remove("k").is_err());
        assert!(!flag_enabled(&store, MAINTENANCE_MODE_KEY));
    }

    #[test]
    fn seeded_entries() {
        let store = MemoryStore::with_entries([(MAINTENANCE_MODE_KEY, "true")]);
        assert!(flag_enabled(&store, MAINTENANCE_MODE_KEY));
    }
}
