//! 성능 관찰 포트.
//!
//! 호스트의 PerformanceObserver / performance timeline 대응.
//! 기능 지원 여부는 시작 시 한 번 [`Capabilities`]로 해석한다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::CoreError;
use crate::models::vitals::{EntryType, MemoryInfo, NavigationTiming, PerformanceEntry};

/// 관찰 채널로 도착하는 엔트리 묶음 스트림 (채널 내 도착 순서 보장)
pub type EntryStream = mpsc::UnboundedReceiver<Vec<PerformanceEntry>>;

/// 기능 지원 여부
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Available,
    #[default]
    Unavailable,
}

impl Capability {
    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available)
    }

    pub fn from_bool(available: bool) -> Self {
        if available {
            Capability::Available
        } else {
            Capability::Unavailable
        }
    }
}

/// 시작 시 한 번 해석되는 호스트 기능 목록
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    /// PerformanceObserver 자체
    pub performance_observer: Capability,
    /// longtask 엔트리 관찰
    pub long_task: Capability,
    /// performance.memory
    pub memory: Capability,
}

impl Capabilities {
    /// 전부 지원
    pub fn all() -> Self {
        Self {
            performance_observer: Capability::Available,
            long_task: Capability::Available,
            memory: Capability::Available,
        }
    }

    /// 채널별 지원 여부
    pub fn supports(&self, entry_type: EntryType) -> bool {
        if !self.performance_observer.is_available() {
            return false;
        }
        match entry_type {
            EntryType::LongTask => self.long_task.is_available(),
            _ => true,
        }
    }
}

/// 성능 엔트리 제공자
pub trait PerformanceSource: Send + Sync {
    /// 해석된 기능 목록
    fn capabilities(&self) -> Capabilities;

    /// 관찰 채널 구독: 미지원이면 `CoreError::Unsupported`
    fn observe(&self, entry_type: EntryType) -> Result<EntryStream, CoreError>;

    /// 현재 내비게이션 타이밍 레코드 (없을 수 있음)
    fn navigation_timing(&self) -> Option<NavigationTiming>;

    /// 버퍼된 타임라인에서 종류별 엔트리 조회
    fn entries_by_type(&self, entry_type: EntryType) -> Vec<PerformanceEntry>;

    /// JS 힙 정보 (미지원이면 None)
    fn memory(&self) -> Option<MemoryInfo>;

    /// 타임라인 기준 시각 (navigationStart)
    fn time_origin(&self) -> DateTime<Utc>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_task_requires_capability() {
        let caps = Capabilities {
            performance_observer: Capability::Available,
            long_task: Capability::Unavailable,
            memory: Capability::Unavailable,
        };
        assert!(caps.supports(EntryType::Resource));
        assert!(!caps.supports(EntryType::LongTask));
    }

    #[test]
    fn nothing_without_observer() {
        let caps = Capabilities::default();
        assert!(!caps.supports(EntryType::LargestContentfulPaint));
        assert!(Capabilities::all().supports(EntryType::LongTask));
    }
}
