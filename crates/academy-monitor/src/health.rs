//! 헬스 체크.
//!
//! 이름 붙은 비동기 프로브 레지스트리. 각 프로브는 독립적으로 실패할 수 있고,
//! 실패는 `critical` 결과로 변환되어 전파되지 않는다.

use academy_core::error::CoreError;
use academy_core::models::health::{HealthCheckResult, HealthStatus};
use academy_core::ports::clock::{elapsed_ms, Clock};
use academy_core::ports::health::{ConnectivityClient, HealthProbe};
use academy_core::ports::performance::PerformanceSource;
use academy_core::ports::storage::{KeyValueStore, HEALTH_CHECK_KEY};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// 프로브 레지스트리
pub struct HealthChecker {
    checks: Vec<(String, Arc<dyn HealthProbe>)>,
    clock: Arc<dyn Clock>,
}

impl HealthChecker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            checks: Vec::new(),
            clock,
        }
    }

    /// 프로브 등록: 같은 이름이면 교체 (등록 순서 유지)
    pub fn register_check(&mut self, name: impl Into<String>, probe: Arc<dyn HealthProbe>) {
        let name = name.into();
        match self.checks.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = probe,
            None => self.checks.push((name, probe)),
        }
    }

    pub fn check_names(&self) -> Vec<&str> {
        self.checks.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// 모든 프로브를 등록 순서대로 실행
    pub async fn run_all_checks(&self) -> Vec<HealthCheckResult> {
        let mut results = Vec::with_capacity(self.checks.len());
        for (name, probe) in &self.checks {
            let result = match probe.check().await {
                Ok(result) => result,
                Err(e) => {
                    warn!("헬스 프로브 실패: {name}: {e}");
                    HealthCheckResult::new(
                        name.clone(),
                        HealthStatus::Critical,
                        0.0,
                        format!("Check failed: {e}"),
                        self.clock.now(),
                    )
                }
            };
            debug!("헬스 체크 {}: {}", result.service, result.status);
            results.push(result);
        }
        results
    }
}

/// 가장 심각한 상태 (결과가 없으면 healthy)
pub fn overall_health(results: &[HealthCheckResult]) -> HealthStatus {
    results
        .iter()
        .map(|r| r.status)
        .max()
        .unwrap_or(HealthStatus::Healthy)
}

// ============================================================
// 기본 프로브
// ============================================================

/// HEAD 요청 연결성 프로브: 2xx healthy, 그 외 warning, 네트워크 실패 critical
pub struct ConnectivityProbe {
    client: Arc<dyn ConnectivityClient>,
    url: String,
    clock: Arc<dyn Clock>,
}

impl ConnectivityProbe {
    pub fn new(
        client: Arc<dyn ConnectivityClient>,
        url: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            clock,
        }
    }
}

#[async_trait]
impl HealthProbe for ConnectivityProbe {
    async fn check(&self) -> Result<HealthCheckResult, CoreError> {
        let start = self.clock.now();
        let outcome = self.client.head(&self.url).await;
        let now = self.clock.now();
        let response_time = elapsed_ms(now, start) as f64;

        let (status, message) = match outcome {
            Ok(code) if (200..300).contains(&code) => {
                (HealthStatus::Healthy, "API is responsive".to_string())
            }
            Ok(code) => (HealthStatus::Warning, format!("HTTP {code}")),
            Err(e) => (HealthStatus::Critical, format!("Connection failed: {e}")),
        };

        Ok(HealthCheckResult::new(
            "API Connectivity",
            status,
            response_time,
            message,
            now,
        ))
    }
}

/// 페이지 로드 시간 프로브
pub struct LoadTimeProbe {
    source: Arc<dyn PerformanceSource>,
    warning_ms: f64,
    critical_ms: f64,
    clock: Arc<dyn Clock>,
}

impl LoadTimeProbe {
    /// `load < warning_ms` healthy, `load < critical_ms` warning, 그 외 critical
    pub fn new(
        source: Arc<dyn PerformanceSource>,
        warning_ms: f64,
        critical_ms: f64,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            warning_ms,
            critical_ms,
            clock,
        }
    }
}

#[async_trait]
impl HealthProbe for LoadTimeProbe {
    async fn check(&self) -> Result<HealthCheckResult, CoreError> {
        // 타이밍이 없으면 0ms로 본다
        let load_time = self
            .source
            .navigation_timing()
            .map(|t| t.load_time())
            .unwrap_or(0.0);

        let status = if load_time < self.warning_ms {
            HealthStatus::Healthy
        } else if load_time < self.critical_ms {
            HealthStatus::Warning
        } else {
            HealthStatus::Critical
        };

        Ok(HealthCheckResult::new(
            "Performance",
            status,
            load_time,
            format!("Page load time: {load_time}ms"),
            self.clock.now(),
        ))
    }
}

/// 키-값 저장소 쓰기+삭제 왕복 프로브: 실패해도 warning
pub struct StorageProbe {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl StorageProbe {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

#[async_trait]
impl HealthProbe for StorageProbe {
    async fn check(&self) -> Result<HealthCheckResult, CoreError> {
        let start = self.clock.now();
        let roundtrip = self
            .store
            .set(HEALTH_CHECK_KEY, "test")
            .and_then(|_| self.store.remove(HEALTH_CHECK_KEY));
        let now = self.clock.now();

        let (status, message) = match roundtrip {
            Ok(()) => (HealthStatus::Healthy, "Local storage is available"),
            Err(e) => {
                debug!("저장소 프로브 실패: {e}");
                (HealthStatus::Warning, "Local storage is not available")
            }
        };

        Ok(HealthCheckResult::new(
            "Local Storage",
            status,
            elapsed_ms(now, start) as f64,
            message,
            now,
        ))
    }
}
