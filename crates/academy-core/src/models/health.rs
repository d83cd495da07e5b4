//! 헬스 체크 모델.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 헬스 상태 (심각도 순 정렬: Healthy < Warning < Critical)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Warning => write!(f, "warning"),
            HealthStatus::Critical => write!(f, "critical"),
        }
    }
}

/// 개별 프로브 결과
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// 서비스 표시 이름
    pub service: String,
    pub status: HealthStatus,
    /// 응답 시간 (밀리초)
    pub response_time_ms: f64,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthCheckResult {
    pub fn new(
        service: impl Into<String>,
        status: HealthStatus,
        response_time_ms: f64,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            service: service.into(),
            status,
            response_time_ms,
            message: message.into(),
            timestamp,
        }
    }
}

/// 페이지 수준 시스템 메트릭
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    /// time origin 이후 경과 시간 (밀리초)
    pub uptime_ms: f64,
    /// JS 힙 사용률 (%)
    pub memory_usage: f64,
    /// 네트워크 지연 (밀리초)
    pub network_latency_ms: f64,
    /// 전체 이벤트 중 에러 이벤트 비율 (0.0 ~ 1.0)
    pub error_rate: f64,
    /// 0 ~ 100
    pub performance_score: f64,
}
