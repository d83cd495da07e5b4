//! 기능 플래그.
//!
//! 키-값 저장소의 `"true"` 문자열로 켜지는 플래그. 값이 없거나 저장소가
//! 차단되면 꺼진 것으로 본다.

use academy_core::error::CoreError;
use academy_core::ports::storage::{
    flag_enabled, KeyValueStore, MAINTENANCE_MODE_KEY, SHOW_MONITORING_KEY,
};
use std::sync::Arc;
use tracing::info;

/// 저장소 기반 기능 플래그
#[derive(Clone)]
pub struct FeatureFlags {
    store: Arc<dyn KeyValueStore>,
}

impl FeatureFlags {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// 점검 모드 여부
    pub fn maintenance_mode(&self) -> bool {
        flag_enabled(self.store.as_ref(), MAINTENANCE_MODE_KEY)
    }

    /// 모니터링 대시보드 표시 여부
    pub fn show_monitoring(&self) -> bool {
        flag_enabled(self.store.as_ref(), SHOW_MONITORING_KEY)
    }

    pub fn set_maintenance_mode(&self, enabled: bool) -> Result<(), CoreError> {
        self.write(MAINTENANCE_MODE_KEY, enabled)
    }

    pub fn set_show_monitoring(&self, enabled: bool) -> Result<(), CoreError> {
        self.write(SHOW_MONITORING_KEY, enabled)
    }

    fn write(&self, key: &str, enabled: bool) -> Result<(), CoreError> {
        if enabled {
            self.store.set(key, "true")?;
        } else {
            self.store.remove(key)?;
        }
        info!("기능 플래그 변경: {key}={enabled}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{BlockedStore, MemoryStore};

    #[test]
    fn flags_default_off() {
        let flags = FeatureFlags::new(Arc::new(MemoryStore::new()));
        assert!(!flags.maintenance_mode());
        assert!(!flags.show_monitoring());
    }

    #[test]
    fn only_literal_true_enables() {
        let store = Arc::new(MemoryStore::with_entries([
            (MAINTENANCE_MODE_KEY, "TRUE"),
            (SHOW_MONITORING_KEY, "true"),
        ]));
        let flags = FeatureFlags::new(store);
        assert!(!flags.maintenance_mode());
        assert!(flags.show_monitoring());
    }

    #[test]
    fn toggle_roundtrip() {
        let flags = FeatureFlags::new(Arc::new(MemoryStore::new()));
        flags.set_maintenance_mode(true).unwrap();
        assert!(flags.maintenance_mode());
        flags.set_maintenance_mode(false).unwrap();
        assert!(!flags.maintenance_mode());
    }

    #[test]
    fn blocked_storage_reads_off_and_write_fails() {
        let flags = FeatureFlags::new(Arc::new(BlockedStore));
        assert!(!flags.show_monitoring());
        assert!(matches!(
            flags.set_show_monitoring(true),
            Err(CoreError::StorageUnavailable)
        ));
    }
}
