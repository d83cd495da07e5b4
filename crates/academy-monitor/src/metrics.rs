//! 페이지 수준 시스템 메트릭 수집.

use academy_core::models::health::SystemMetrics;
use academy_core::models::vitals::EntryType;
use academy_core::ports::clock::{elapsed_ms, Clock};
use academy_core::ports::performance::PerformanceSource;
use std::sync::Arc;
use tracing::debug;

/// LCP 1ms당 감점 비율 (100 - LCP/25)
const LCP_SCORE_DIVISOR: f64 = 25.0;

/// 시스템 메트릭 수집기
///
/// 측정할 수 없는 항목은 직전 값을 유지한다.
pub struct SystemMetricsCollector {
    source: Arc<dyn PerformanceSource>,
    clock: Arc<dyn Clock>,
    last: SystemMetrics,
}

impl SystemMetricsCollector {
    pub fn new(source: Arc<dyn PerformanceSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            clock,
            last: SystemMetrics::default(),
        }
    }

    /// `error_rate`는 분석 싱크가 집계한 값 (0.0 ~ 1.0)
    pub fn collect(&mut self, error_rate: f64) -> SystemMetrics {
        let now = self.clock.now();
        self.last.uptime_ms = elapsed_ms(now, self.source.time_origin()).max(0) as f64;

        if let Some(memory) = self.source.memory() {
            self.last.memory_usage = memory.usage_percent();
        }

        if let Some(timing) = self.source.navigation_timing() {
            self.last.network_latency_ms = timing.time_to_first_byte();
        }

        self.last.error_rate = error_rate;

        if let Some(lcp) = self
            .source
            .entries_by_type(EntryType::LargestContentfulPaint)
            .last()
        {
            self.last.performance_score = (100.0 - lcp.start_time / LCP_SCORE_DIVISOR).max(0.0);
        }

        debug!(
            "시스템 메트릭: 가동 {}ms, 메모리 {:.1}%, 지연 {}ms",
            self.last.uptime_ms, self.last.memory_usage, self.last.network_latency_ms
        );
        self.last.clone()
    }

    pub fn last(&self) -> &SystemMetrics {
        &self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PerformanceHub;
    use academy_core::models::vitals::{MemoryInfo, NavigationTiming, PerformanceEntry};
    use academy_core::ports::clock::ManualClock;
    use academy_core::ports::performance::Capabilities;

    #[test]
    fn collects_from_source() {
        let clock = Arc::new(ManualClock::at_epoch());
        let hub = Arc::new(PerformanceHub::new(Capabilities::all(), clock.now()));
        hub.set_navigation_timing(NavigationTiming {
            fetch_start: 0.0,
            request_start: 40.0,
            response_start: 160.0,
            load_event_end: 900.0,
        });
        hub.set_memory(MemoryInfo {
            used_js_heap_size: 25,
            total_js_heap_size: 100,
        });
        hub.record(vec![
            PerformanceEntry::new(EntryType::LargestContentfulPaint, "", 1000.0),
            PerformanceEntry::new(EntryType::LargestContentfulPaint, "", 1500.0),
        ]);
        clock.advance_ms(5_000);

        let mut collector = SystemMetricsCollector::new(hub, clock);
        let metrics = collector.collect(0.25);
        assert_eq!(metrics.uptime_ms, 5_000.0);
        assert_eq!(metrics.memory_usage, 25.0);
        assert_eq!(metrics.network_latency_ms, 120.0);
        assert_eq!(metrics.error_rate, 0.25);
        assert_eq!(metrics.performance_score, 40.0);
    }

    #[test]
    fn score_floor_and_missing_inputs() {
        let clock = Arc::new(ManualClock::at_epoch());
        let hub = Arc::new(PerformanceHub::new(Capabilities::default(), clock.now()));
        let mut collector = SystemMetricsCollector::new(hub.clone(), clock);

        let metrics = collector.collect(0.0);
        assert_eq!(metrics.memory_usage, 0.0);
        assert_eq!(metrics.performance_score, 0.0);

        hub.record(vec![PerformanceEntry::new(
            EntryType::LargestContentfulPaint,
            "",
            4000.0,
        )]);
        assert_eq!(collector.collect(0.0).performance_score, 0.0);
    }
}
