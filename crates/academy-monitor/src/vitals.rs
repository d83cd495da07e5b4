//! Web Vitals 수집.
//!
//! LCP/FID/CLS/FCP는 관찰 채널 구독으로, TTFB는 시작 시점의 내비게이션 타이밍으로 계산한다.
//! 계산된 값은 곧바로 등급화되어 콜백으로 전달된다 (버퍼링 없음).

use academy_core::config::VitalsConfig;
use academy_core::handle::{wait_for_shutdown, TaskHandle};
use academy_core::models::vitals::{
    EntryDetail, EntryType, Metric, MetricName, NavigationTiming, PerformanceEntry,
};
use academy_core::ports::performance::PerformanceSource;
use std::sync::Arc;
use tracing::debug;

use crate::classifier::classify;

/// FCP 엔트리 이름
pub const FIRST_CONTENTFUL_PAINT: &str = "first-contentful-paint";

/// 구독으로 계산하는 채널
const OBSERVED_CHANNELS: [EntryType; 4] = [
    EntryType::LargestContentfulPaint,
    EntryType::FirstInput,
    EntryType::LayoutShift,
    EntryType::Paint,
];

/// 지표별 추출 상태
///
/// - LCP: 배치의 마지막 엔트리 시각으로 교체
/// - FID: 입력 엔트리마다 `processing_start - start_time`
/// - CLS: 최근 입력이 없는 이동 점수의 누적합 (감소하지 않음)
/// - FCP: `first-contentful-paint` 첫 엔트리 한 번만
#[derive(Debug, Clone)]
pub struct VitalsState {
    thresholds: VitalsConfig,
    lcp: Option<f64>,
    cls: f64,
    fcp_reported: bool,
}

impl VitalsState {
    pub fn new(thresholds: VitalsConfig) -> Self {
        Self {
            thresholds,
            lcp: None,
            cls: 0.0,
            fcp_reported: false,
        }
    }

    /// 한 채널의 엔트리 배치를 처리해 새 지표를 반환
    pub fn ingest(&mut self, entry_type: EntryType, entries: &[PerformanceEntry]) -> Vec<Metric> {
        match entry_type {
            EntryType::LargestContentfulPaint => self.on_lcp(entries).into_iter().collect(),
            EntryType::FirstInput => self.on_first_input(entries),
            EntryType::LayoutShift => self.on_layout_shift(entries).into_iter().collect(),
            EntryType::Paint => self.on_paint(entries).into_iter().collect(),
            _ => Vec::new(),
        }
    }

    pub fn cumulative_layout_shift(&self) -> f64 {
        self.cls
    }

    fn on_lcp(&mut self, entries: &[PerformanceEntry]) -> Option<Metric> {
        let value = entries.last()?.start_time;
        let delta = value - self.lcp.unwrap_or(0.0);
        self.lcp = Some(value);
        Some(self.metric(MetricName::Lcp, value, delta, entries.to_vec()))
    }

    fn on_first_input(&self, entries: &[PerformanceEntry]) -> Vec<Metric> {
        entries
            .iter()
            .filter_map(|entry| match entry.detail {
                EntryDetail::FirstInput { processing_start } => {
                    let fid = (processing_start - entry.start_time).max(0.0);
                    Some(self.metric(MetricName::Fid, fid, fid, vec![entry.clone()]))
                }
                _ => None,
            })
            .collect()
    }

    fn on_layout_shift(&mut self, entries: &[PerformanceEntry]) -> Option<Metric> {
        if entries.is_empty() {
            return None;
        }
        let before = self.cls;
        for entry in entries {
            if let EntryDetail::LayoutShift {
                value,
                had_recent_input: false,
            } = entry.detail
            {
                self.cls += value.max(0.0);
            }
        }
        Some(self.metric(
            MetricName::Cls,
            self.cls,
            self.cls - before,
            entries.to_vec(),
        ))
    }

    fn on_paint(&mut self, entries: &[PerformanceEntry]) -> Option<Metric> {
        if self.fcp_reported {
            return None;
        }
        let entry = entries.iter().find(|e| e.name == FIRST_CONTENTFUL_PAINT)?;
        self.fcp_reported = true;
        let value = entry.start_time;
        Some(self.metric(MetricName::Fcp, value, value, vec![entry.clone()]))
    }

    fn metric(
        &self,
        name: MetricName,
        value: f64,
        delta: f64,
        entries: Vec<PerformanceEntry>,
    ) -> Metric {
        Metric {
            name,
            value,
            rating: classify(value, self.thresholds.thresholds_for(name)),
            delta,
            entries,
        }
    }
}

/// 내비게이션 타이밍에서 TTFB 지표 생성
pub fn ttfb_metric(thresholds: &VitalsConfig, timing: &NavigationTiming) -> Metric {
    let value = timing.time_to_first_byte().max(0.0);
    let entry = PerformanceEntry::new(EntryType::Navigation, "navigation", 0.0)
        .with_duration(timing.load_event_end);
    Metric {
        name: MetricName::Ttfb,
        value,
        rating: classify(value, thresholds.thresholds_for(MetricName::Ttfb)),
        delta: value,
        entries: vec![entry],
    }
}

/// Web Vitals 수집기
pub struct VitalsCollector {
    source: Arc<dyn PerformanceSource>,
    thresholds: VitalsConfig,
}

impl VitalsCollector {
    pub fn new(source: Arc<dyn PerformanceSource>, thresholds: VitalsConfig) -> Self {
        Self { source, thresholds }
    }

    /// 수집 시작
    ///
    /// TTFB는 호출 중에 동기적으로 콜백된다. 나머지 채널은 각자의 태스크에서
    /// 도착 순서대로 처리되며, 지원되지 않는 채널은 건너뛴다.
    /// tokio 런타임 안에서 호출해야 한다.
    pub fn start<F>(&self, callback: F) -> TaskHandle
    where
        F: Fn(Metric) + Send + Sync + 'static,
    {
        let callback = Arc::new(callback);
        let mut handle = TaskHandle::new("web-vitals");

        match self.source.navigation_timing() {
            Some(timing) => callback(ttfb_metric(&self.thresholds, &timing)),
            None => debug!("내비게이션 타이밍 없음, TTFB 생략"),
        }

        let capabilities = self.source.capabilities();
        for entry_type in OBSERVED_CHANNELS {
            if !capabilities.supports(entry_type) {
                debug!("관찰 채널 미지원, 비활성화: {entry_type}");
                continue;
            }
            let mut stream = match self.source.observe(entry_type) {
                Ok(stream) => stream,
                Err(e) => {
                    debug!("관찰 채널 구독 실패, 비활성화: {entry_type}: {e}");
                    continue;
                }
            };

            let mut shutdown_rx = handle.shutdown_rx();
            let callback = callback.clone();
            let mut state = VitalsState::new(self.thresholds);

            handle.push(tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = wait_for_shutdown(&mut shutdown_rx) => break,
                        batch = stream.recv() => match batch {
                            Some(entries) => {
                                for metric in state.ingest(entry_type, &entries) {
                                    callback(metric);
                                }
                            }
                            None => break,
                        },
                    }
                }
                debug!("Web Vitals 채널 종료: {entry_type}");
            }));
        }

        handle
    }
}
