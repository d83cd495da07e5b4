//! 프로세스 내 성능 관찰 소스.
//!
//! `PerformanceSource` 포트 구현. 호스트(또는 트레이스 재생기)가 엔트리 배치를
//! `record`로 밀어 넣으면, 채널별 구독자에게 도착 순서대로 전달하고
//! 버퍼 타임라인에도 남긴다. 지원 여부는 생성 시 한 번 정해진 `Capabilities`를 따른다.
//! 타임라인은 상한을 넘으면 가장 오래된 엔트리부터 버린다.

use academy_core::error::CoreError;
use academy_core::models::vitals::{EntryType, MemoryInfo, NavigationTiming, PerformanceEntry};
use academy_core::ports::performance::{Capabilities, EntryStream, PerformanceSource};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use tokio::sync::mpsc;
use tracing::debug;

/// 버퍼 타임라인 기본 상한
pub const DEFAULT_TIMELINE_CAPACITY: usize = 1000;

#[derive(Default)]
struct HubState {
    navigation: Option<NavigationTiming>,
    memory: Option<MemoryInfo>,
    timeline: VecDeque<PerformanceEntry>,
    subscribers: HashMap<EntryType, Vec<mpsc::UnboundedSender<Vec<PerformanceEntry>>>>,
}

/// 채널별 구독자에게 엔트리를 팬아웃하는 성능 소스
pub struct PerformanceHub {
    capabilities: Capabilities,
    time_origin: DateTime<Utc>,
    timeline_capacity: usize,
    state: Mutex<HubState>,
}

impl PerformanceHub {
    pub fn new(capabilities: Capabilities, time_origin: DateTime<Utc>) -> Self {
        Self::with_timeline_capacity(capabilities, time_origin, DEFAULT_TIMELINE_CAPACITY)
    }

    /// 타임라인 상한 지정 (0이면 1로 취급)
    pub fn with_timeline_capacity(
        capabilities: Capabilities,
        time_origin: DateTime<Utc>,
        timeline_capacity: usize,
    ) -> Self {
        Self {
            capabilities,
            time_origin,
            timeline_capacity: timeline_capacity.max(1),
            state: Mutex::new(HubState::default()),
        }
    }

    /// 타임라인에 남아 있는 엔트리 수
    pub fn timeline_len(&self) -> usize {
        self.state.lock().timeline.len()
    }

    pub fn set_navigation_timing(&self, timing: NavigationTiming) {
        self.state.lock().navigation = Some(timing);
    }

    /// 메모리 정보 갱신 (memory capability가 없으면 무시)
    pub fn set_memory(&self, memory: MemoryInfo) {
        if self.capabilities.memory.is_available() {
            self.state.lock().memory = Some(memory);
        }
    }

    /// 엔트리 배치 기록
    ///
    /// 같은 종류끼리 묶어 구독자에게 보낸다. 닫힌 구독자는 제거된다.
    /// 반환값은 배치를 받은 구독자 수.
    pub fn record(&self, entries: Vec<PerformanceEntry>) -> usize {
        let mut groups: Vec<(EntryType, Vec<PerformanceEntry>)> = Vec::new();
        for entry in entries {
            match groups.iter_mut().find(|(t, _)| *t == entry.entry_type) {
                Some((_, group)) => group.push(entry),
                None => groups.push((entry.entry_type, vec![entry])),
            }
        }

        let mut state = self.state.lock();
        let mut delivered = 0;
        for (entry_type, group) in groups {
            state.timeline.extend(group.iter().cloned());
            if let Some(subscribers) = state.subscribers.get_mut(&entry_type) {
                subscribers.retain(|tx| tx.send(group.clone()).is_ok());
                delivered += subscribers.len();
            }
        }

        let overflow = state.timeline.len().saturating_sub(self.timeline_capacity);
        if overflow > 0 {
            state.timeline.drain(..overflow);
            debug!("성능 타임라인 상한 초과, 오래된 엔트리 {overflow}건 제거");
        }
        delivered
    }

    /// 채널의 활성 구독자 수
    pub fn subscriber_count(&self, entry_type: EntryType) -> usize {
        let mut state = self.state.lock();
        match state.subscribers.get_mut(&entry_type) {
            Some(subscribers) => {
                subscribers.retain(|tx| !tx.is_closed());
                subscribers.len()
            }
            None => 0,
        }
    }
}

impl PerformanceSource for PerformanceHub {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn observe(&self, entry_type: EntryType) -> Result<EntryStream, CoreError> {
        if !self.capabilities.supports(entry_type) {
            return Err(CoreError::Unsupported(format!("{entry_type} 관찰 미지원")));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        self.state
            .lock()
            .subscribers
            .entry(entry_type)
            .or_default()
            .push(tx);
        debug!("성능 관찰 구독: {entry_type}");
        Ok(rx)
    }

    fn navigation_timing(&self) -> Option<NavigationTiming> {
        self.state.lock().navigation
    }

    fn entries_by_type(&self, entry_type: EntryType) -> Vec<PerformanceEntry> {
        self.state
            .lock()
            .timeline
            .iter()
            .filter(|e| e.entry_type == entry_type)
            .cloned()
            .collect()
    }

    fn memory(&self) -> Option<MemoryInfo> {
        self.state.lock().memory
    }

    fn time_origin(&self) -> DateTime<Utc> {
        self.time_origin
    }
}
