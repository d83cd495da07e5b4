//! 영속 키-값 저장소 포트 (`localStorage` 대응).
//!
//! 구현: `academy-storage` crate (인메모리, SQLite).
//! 여러 컴포넌트가 잠금 없이 서로 다른 키 네임스페이스를 사용한다 (last-writer-wins).

use crate::error::CoreError;

/// 영속 세션 ID
pub const SESSION_ID_KEY: &str = "session_id";
/// 언로드 시 저장되는 세션 스냅샷 (JSON)
pub const SESSION_DATA_KEY: &str = "session_data";
/// 점검 모드 플래그 (`"true"`면 활성)
pub const MAINTENANCE_MODE_KEY: &str = "maintenance-mode";
/// 모니터링 대시보드 표시 플래그 (`"true"`면 표시)
pub const SHOW_MONITORING_KEY: &str = "show-monitoring";
/// A/B 배정 영속화 (옵션, JSON 맵)
pub const AB_ASSIGNMENTS_KEY: &str = "ab_assignments";
/// 저장소 헬스 체크용 임시 키
pub const HEALTH_CHECK_KEY: &str = "health_check_test";

/// 동기 문자열 키-값 저장소
pub trait KeyValueStore: Send + Sync {
    /// 값 조회 (없으면 None)
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;

    /// 값 저장 (덮어쓰기)
    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;

    /// 값 삭제 (없어도 성공)
    fn remove(&self, key: &str) -> Result<(), CoreError>;
}

/// 플래그 키가 정확히 `"true"`인지 확인: 저장소 오류는 false
pub fn flag_enabled(store: &dyn KeyValueStore, key: &str) -> bool {
    matches!(store.get(key), Ok(Some(ref v)) if v == "true")
}
