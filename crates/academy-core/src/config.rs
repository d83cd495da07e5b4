//! 애플리케이션 설정 구조체.
//!
//! 지표 임계값, 성능 예산, 캐시 크기, 세션 타이머, 헬스 체크, 실험 설정 등
//! 런타임 설정을 정의한다. 파일은 [`crate::config_manager`]가,
//! 환경변수 오버라이드는 `academy-app`이 `config` crate로 얹는다.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::models::budget::PerformanceBudget;
use crate::models::vitals::{MetricName, Thresholds};

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 실행 환경
    #[serde(default)]
    pub environment: Environment,
    /// Web Vitals 등급 임계값
    #[serde(default)]
    pub vitals: VitalsConfig,
    /// 성능 예산
    #[serde(default)]
    pub budget: PerformanceBudget,
    /// 캐시 설정
    #[serde(default)]
    pub cache: CacheConfig,
    /// 세션 추적 설정
    #[serde(default)]
    pub session: SessionConfig,
    /// 헬스 체크 설정
    #[serde(default)]
    pub health: HealthConfig,
    /// 리소스/롱태스크 감시 설정
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// A/B 실험 설정
    #[serde(default)]
    pub experiment: ExperimentConfig,
    /// 에러 바운더리 설정
    #[serde(default)]
    pub error_boundary: ErrorBoundaryConfig,
    /// 저장소 설정
    #[serde(default)]
    pub storage: StorageConfig,
}

/// 실행 환경: development에서만 콘솔 프로바이더와 대시보드가 기본 활성
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

// ============================================================
// Web Vitals 임계값
// ============================================================

/// Core Web Vitals 임계값 테이블
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalsConfig {
    pub lcp: Thresholds,
    pub fid: Thresholds,
    pub cls: Thresholds,
    pub fcp: Thresholds,
    pub ttfb: Thresholds,
}

impl VitalsConfig {
    pub fn thresholds_for(&self, name: MetricName) -> Thresholds {
        match name {
            MetricName::Lcp => self.lcp,
            MetricName::Fid => self.fid,
            MetricName::Cls => self.cls,
            MetricName::Fcp => self.fcp,
            MetricName::Ttfb => self.ttfb,
        }
    }
}

impl Default for VitalsConfig {
    fn default() -> Self {
        Self {
            lcp: Thresholds::new(2500.0, 4000.0),
            fid: Thresholds::new(100.0, 300.0),
            cls: Thresholds::new(0.1, 0.25),
            fcp: Thresholds::new(1800.0, 3000.0),
            ttfb: Thresholds::new(800.0, 1800.0),
        }
    }
}

// ============================================================
// 캐시 설정
// ============================================================

/// 단일 캐시 크기/TTL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSpec {
    pub max_size: usize,
    pub default_ttl_ms: u64,
}

impl CacheSpec {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }
}

/// 캐시 인스턴스별 설정
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// API 응답 캐시
    pub api: CacheSpec,
    /// 이미지 URL 캐시
    pub image: CacheSpec,
    /// 컴포넌트 결과 캐시
    pub component: CacheSpec,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            api: CacheSpec {
                max_size: 50,
                default_ttl_ms: 5 * 60 * 1000,
            },
            image: CacheSpec {
                max_size: 100,
                default_ttl_ms: 30 * 60 * 1000,
            },
            component: CacheSpec {
                max_size: 25,
                default_ttl_ms: 10 * 60 * 1000,
            },
        }
    }
}

// ============================================================
// 세션 설정
// ============================================================

/// 세션 추적 설정
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// 비활성 전환까지의 무입력 시간 (밀리초)
    #[serde(default = "default_inactivity_timeout_ms")]
    pub inactivity_timeout_ms: u64,
    /// 하트비트 주기 (밀리초)
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
    /// 비활성 검사 주기 (밀리초)
    #[serde(default = "default_inactivity_poll_ms")]
    pub inactivity_poll_ms: u64,
    /// 이벤트 로그 상한
    #[serde(default = "default_max_events")]
    pub max_events: usize,
    /// 상한 초과 시 남길 최근 이벤트 수
    #[serde(default = "default_compact_to")]
    pub compact_to: usize,
}

impl SessionConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_millis(self.inactivity_timeout_ms)
    }

    pub fn inactivity_poll(&self) -> Duration {
        Duration::from_millis(self.inactivity_poll_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout_ms: default_inactivity_timeout_ms(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            inactivity_poll_ms: default_inactivity_poll_ms(),
            max_events: default_max_events(),
            compact_to: default_compact_to(),
        }
    }
}

// ============================================================
// 헬스 체크 설정
// ============================================================

/// 헬스 체크 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthConfig {
    /// 연결성 프로브 대상 (None이면 현재 페이지 origin)
    #[serde(default)]
    pub connectivity_url: Option<String>,
    /// HEAD 요청 타임아웃 (밀리초)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// 이 로드 시간 미만이면 healthy (밀리초)
    #[serde(default = "default_load_warning_ms")]
    pub load_warning_ms: u64,
    /// 이 로드 시간 미만이면 warning, 이상이면 critical (밀리초)
    #[serde(default = "default_load_critical_ms")]
    pub load_critical_ms: u64,
}

impl HealthConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            connectivity_url: None,
            request_timeout_ms: default_request_timeout_ms(),
            load_warning_ms: default_load_warning_ms(),
            load_critical_ms: default_load_critical_ms(),
        }
    }
}

// ============================================================
// 리소스 감시 설정
// ============================================================

/// 리소스/롱태스크 감시 임계값
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// 대형 리소스 기준 전송 크기 (바이트)
    pub large_resource_bytes: u64,
    /// 롱태스크 기준 지속 시간 (밀리초)
    pub long_task_ms: f64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            large_resource_bytes: 100_000,
            long_task_ms: 50.0,
        }
    }
}

// ============================================================
// 실험 / 에러 바운더리 / 저장소
// ============================================================

/// A/B 실험 설정
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// 배정을 영속 저장소에 기록해 새로고침 후에도 유지
    #[serde(default)]
    pub persist_assignments: bool,
}

/// 에러 바운더리 설정
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBoundaryConfig {
    /// 전체 새로고침 전 허용되는 재시도 횟수
    pub max_retries: u32,
}

impl Default for ErrorBoundaryConfig {
    fn default() -> Self {
        Self { max_retries: 3 }
    }
}

/// 저장소 설정
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 키-값 DB 디렉토리 (None이면 플랫폼 기본 경로)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl AppConfig {
    /// 기본 설정 생성
    pub fn default_config() -> Self {
        Self {
            environment: Environment::default(),
            vitals: VitalsConfig::default(),
            budget: PerformanceBudget::default(),
            cache: CacheConfig::default(),
            session: SessionConfig::default(),
            health: HealthConfig::default(),
            monitor: MonitorConfig::default(),
            experiment: ExperimentConfig::default(),
            error_boundary: ErrorBoundaryConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_inactivity_timeout_ms() -> u64 {
    30 * 60 * 1000 // 30분
}

fn default_heartbeat_interval_ms() -> u64 {
    60 * 1000 // 1분
}

fn default_inactivity_poll_ms() -> u64 {
    1000
}

fn default_max_events() -> usize {
    1000
}

fn default_compact_to() -> usize {
    500
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_load_warning_ms() -> u64 {
    3000
}

fn default_load_critical_ms() -> u64 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrip_preserves_values() {
        let mut config = AppConfig::default_config();
        config.environment = Environment::Production;
        config.session.heartbeat_interval_ms = 15_000;

        let json = serde_json::to_string(&config).unwrap();
        let back: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.environment, Environment::Production);
        assert_eq!(back.session.heartbeat_interval_ms, 15_000);
    }

    #[test]
    fn empty_json_uses_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert!(config.environment.is_development());
        assert_eq!(config.health.load_warning_ms, 3000);
        assert_eq!(config.monitor.large_resource_bytes, 100_000);
        assert_eq!(config.budget.max_fid, 100.0);
    }

    #[test]
    fn partial_session_section() {
        let config: AppConfig =
            serde_json::from_str(r#"{"session": {"heartbeat_interval_ms": 5000}}"#).unwrap();
        assert_eq!(config.session.heartbeat_interval(), Duration::from_secs(5));
        assert_eq!(config.session.max_events, 1000);
    }
}
