//! 모니터링 대시보드.
//!
//! 지표별 최신 값, 마지막 헬스 체크, 시스템 메트릭을 모아 스냅샷으로 내보낸다.
//! 개발 환경이거나 `show-monitoring` 플래그가 켜져 있을 때만 노출한다.

use std::collections::BTreeMap;
use std::fmt;

use academy_core::config::Environment;
use academy_core::models::health::{HealthCheckResult, HealthStatus, SystemMetrics};
use academy_core::models::vitals::{Metric, MetricName, Rating};
use academy_monitor::health::overall_health;
use academy_storage::flags::FeatureFlags;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

/// 지표 한 건의 최신 값
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VitalReading {
    pub name: MetricName,
    pub value: f64,
    pub rating: Rating,
}

#[derive(Default)]
struct DashboardInner {
    vitals: BTreeMap<MetricName, VitalReading>,
    health: Vec<HealthCheckResult>,
    system: Option<SystemMetrics>,
}

/// 대시보드 상태: 콜백 스레드에서 갱신, 렌더 시점에 스냅샷
#[derive(Default)]
pub struct DashboardState {
    inner: Mutex<DashboardInner>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 지표 갱신 (같은 지표는 마지막 값만 유지)
    pub fn record_metric(&self, metric: &Metric) {
        self.inner.lock().vitals.insert(
            metric.name,
            VitalReading {
                name: metric.name,
                value: metric.value,
                rating: metric.rating,
            },
        );
    }

    /// 마지막 헬스 체크 결과로 교체
    pub fn record_health(&self, results: Vec<HealthCheckResult>) {
        self.inner.lock().health = results;
    }

    pub fn record_system(&self, metrics: SystemMetrics) {
        self.inner.lock().system = Some(metrics);
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> DashboardSnapshot {
        let inner = self.inner.lock();
        let overall = if inner.health.is_empty() {
            None
        } else {
            Some(overall_health(&inner.health))
        };
        DashboardSnapshot {
            vitals: inner.vitals.values().cloned().collect(),
            overall,
            health: inner.health.clone(),
            system: inner.system.clone(),
            generated_at: now,
        }
    }
}

/// 대시보드 노출 여부
pub fn is_visible(environment: Environment, flags: &FeatureFlags) -> bool {
    environment.is_development() || flags.show_monitoring()
}

/// 렌더용 스냅샷
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    /// `MetricName` 순서 (LCP, FID, CLS, FCP, TTFB)
    pub vitals: Vec<VitalReading>,
    /// 헬스 체크를 한 번도 돌리지 않았으면 None
    pub overall: Option<HealthStatus>,
    pub health: Vec<HealthCheckResult>,
    pub system: Option<SystemMetrics>,
    pub generated_at: DateTime<Utc>,
}

impl DashboardSnapshot {
    pub fn vital(&self, name: MetricName) -> Option<&VitalReading> {
        self.vitals.iter().find(|v| v.name == name)
    }
}

impl fmt::Display for DashboardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Performance Monitor")?;
        writeln!(f, "-------------------")?;

        for name in MetricName::ALL {
            let label = name.as_str();
            match self.vital(name) {
                Some(reading) if name == MetricName::Cls => {
                    writeln!(f, "{:<5} {:>10.3}  {}", label, reading.value, reading.rating)?
                }
                Some(reading) => {
                    writeln!(f, "{:<5} {:>8.0}ms  {}", label, reading.value, reading.rating)?
                }
                None => writeln!(f, "{:<5} {:>10}", label, "-")?,
            }
        }

        match self.overall {
            Some(status) => writeln!(f, "System {status}")?,
            None => writeln!(f, "System (not checked)")?,
        }
        for result in &self.health {
            writeln!(
                f,
                "  {:<18} {:<8} {:>7.0}ms  {}",
                result.service,
                result.status.to_string(),
                result.response_time_ms,
                result.message
            )?;
        }

        if let Some(system) = &self.system {
            writeln!(f, "Uptime: {:.0}ms", system.uptime_ms)?;
            writeln!(f, "Response: {:.0}ms", system.network_latency_ms)?;
            writeln!(f, "Error Rate: {:.1}%", system.error_rate * 100.0)?;
            writeln!(f, "Memory Usage: {:.1}%", system.memory_usage)?;
            writeln!(f, "Score: {:.0}", system.performance_score)?;
        }
        Ok(())
    }
}
