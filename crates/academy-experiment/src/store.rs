//! 고정 배정 저장소.
//!
//! 기본은 프로세스 메모리에만 둔다. 영속 모드에서는 배정 맵 전체를
//! `ab_assignments` 키에 JSON으로 기록하고, 생성 시 다시 읽어온다.

use academy_core::ports::storage::{KeyValueStore, AB_ASSIGNMENTS_KEY};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// 배정 키 → 변형 ID
pub struct AssignmentStore {
    assignments: BTreeMap<String, String>,
    backing: Option<Arc<dyn KeyValueStore>>,
}

impl AssignmentStore {
    pub fn in_memory() -> Self {
        Self {
            assignments: BTreeMap::new(),
            backing: None,
        }
    }

    /// 키-값 저장소에 기록하는 저장소: 기존 배정을 읽지 못하면 빈 상태로 시작
    pub fn persistent(store: Arc<dyn KeyValueStore>) -> Self {
        let assignments: BTreeMap<String, String> = match store.get(AB_ASSIGNMENTS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("저장된 A/B 배정 파싱 실패, 초기화: {e}");
                BTreeMap::new()
            }),
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                warn!("A/B 배정 로드 실패, 메모리만 사용: {e}");
                BTreeMap::new()
            }
        };
        debug!("A/B 배정 {}건 로드", assignments.len());

        Self {
            assignments,
            backing: Some(store),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.assignments.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: String, variant_id: String) {
        self.assignments.insert(key, variant_id);
        self.flush();
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn is_persistent(&self) -> bool {
        self.backing.is_some()
    }

    fn flush(&self) {
        let Some(store) = &self.backing else {
            return;
        };
        let result = serde_json::to_string(&self.assignments)
            .map_err(academy_core::error::CoreError::from)
            .and_then(|json| store.set(AB_ASSIGNMENTS_KEY, &json));
        if let Err(e) = result {
            warn!("A/B 배정 저장 실패 (메모리 배정은 유지): {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_storage::memory::{BlockedStore, MemoryStore};

    #[test]
    fn in_memory_store() {
        let mut store = AssignmentStore::in_memory();
        assert!(store.get("t_anonymous").is_none());
        store.insert("t_anonymous".into(), "control".into());
        assert_eq!(store.get("t_anonymous"), Some("control"));
        assert!(!store.is_persistent());
    }

    #[test]
    fn persistent_store_survives_reload() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        {
            let mut store = AssignmentStore::persistent(kv.clone());
            store.insert("t_u1".into(), "variant_a".into());
        }
        let reloaded = AssignmentStore::persistent(kv);
        assert_eq!(reloaded.get("t_u1"), Some("variant_a"));
    }

    #[test]
    fn corrupt_or_blocked_backing_degrades() {
        let kv: Arc<dyn KeyValueStore> =
            Arc::new(MemoryStore::with_entries([(AB_ASSIGNMENTS_KEY, "not json")]));
        assert!(AssignmentStore::persistent(kv).is_empty());

        let mut blocked = AssignmentStore::persistent(Arc::new(BlockedStore));
        blocked.insert("k".into(), "v".into());
        assert_eq!(blocked.get("k"), Some("v"));
    }
}
