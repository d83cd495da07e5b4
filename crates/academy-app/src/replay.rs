//! 트레이스 재생.
//!
//! 녹화된 페이지 로드(JSON)를 [`TelemetryContext`]에 순서대로 흘려 넣는다.
//! 시계는 `ManualClock`, 난수는 시드 고정 `SeededRandom`이므로 같은 트레이스는
//! 항상 같은 세션 로그와 이벤트 열을 만든다. 세션 하트비트/비활성 타이머는
//! 실제 타이머 대신 트레이스 시각을 따라 직접 구동한다.
//!
//! 관찰 채널 태스크가 배치를 소비하도록 각 단계 뒤에 양보하므로
//! current_thread 런타임에서 실행해야 한다.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use academy_analytics::environment::StaticEnvironment;
use academy_analytics::providers::MemoryProvider;
use academy_core::config::AppConfig;
use academy_core::error::CoreError;
use academy_core::models::budget::PerformanceScore;
use academy_core::models::event::DispatchedEvent;
use academy_core::models::health::{HealthCheckResult, SystemMetrics};
use academy_core::models::page::{DeviceInfo, PageContext};
use academy_core::models::session::{InteractionKind, SessionSummary};
use academy_core::models::vitals::{MemoryInfo, NavigationTiming, PerformanceEntry};
use academy_core::ports::clock::{Clock, ManualClock};
use academy_core::ports::performance::Capabilities;
use academy_core::ports::random::SeededRandom;
use academy_core::ports::storage::KeyValueStore;
use academy_monitor::source::PerformanceHub;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::context::{HostDeps, TelemetryContext};
use crate::dashboard::DashboardSnapshot;

/// 배치 기록 후 관찰 태스크에 넘겨주는 양보 횟수
const SETTLE_YIELDS: usize = 16;

// ============================================================
// 트레이스 형식
// ============================================================

/// 녹화된 페이지 로드
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    /// 랜딩 URL
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub referrer: String,
    #[serde(default)]
    pub device: DeviceInfo,
    #[serde(default = "Capabilities::all")]
    pub capabilities: Capabilities,
    #[serde(default)]
    pub navigation: Option<NavigationTiming>,
    #[serde(default)]
    pub memory: Option<MemoryInfo>,
    /// 트레이스 기준 시각 (없으면 2026-01-01T00:00:00Z)
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub steps: Vec<TraceStep>,
}

impl Trace {
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let trace: Trace = serde_json::from_str(json)?;
        trace.validate()?;
        Ok(trace)
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// 단계 시각이 음수이거나 뒤로 가면 거부
    pub fn validate(&self) -> Result<(), CoreError> {
        let mut previous = 0;
        for (index, step) in self.steps.iter().enumerate() {
            if step.at_ms < previous {
                return Err(CoreError::Validation {
                    field: format!("steps[{index}].at_ms"),
                    message: format!("{} < {previous}", step.at_ms),
                });
            }
            previous = step.at_ms;
        }
        Url::parse(&self.url).map_err(|e| CoreError::Validation {
            field: "url".to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

/// 트레이스 한 단계 (`at_ms`는 기준 시각으로부터의 밀리초)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceStep {
    pub at_ms: i64,
    pub action: TraceAction,
}

/// 단계 동작
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceAction {
    /// 성능 엔트리 배치
    Entries { entries: Vec<PerformanceEntry> },
    /// 페이지 조회 (url이 있으면 먼저 이동)
    PageView {
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        title: Option<String>,
    },
    /// 사용자 상호작용 (element가 있으면 분석 이벤트도 기록)
    Interaction {
        interaction: InteractionKind,
        #[serde(default)]
        element: Option<String>,
    },
    Visibility { hidden: bool },
    /// 전환: 실험 배정이 있으면 실험 전환도 기록
    Conversion {
        conversion: String,
        #[serde(default)]
        value: Option<f64>,
        #[serde(default)]
        test_id: Option<String>,
    },
    /// 에러: boundary면 에러 바운더리로 포착
    Error {
        message: String,
        #[serde(default)]
        stack: Option<String>,
        #[serde(default)]
        boundary: bool,
    },
    /// 실험 변형 조회
    Variant {
        test_id: String,
        #[serde(default)]
        user_id: Option<String>,
    },
    Identify { user_id: String },
    Memory(MemoryInfo),
}

// ============================================================
// 재생
// ============================================================

/// 재생 결과
#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutcome {
    pub session_id: String,
    /// 언로드 직후 세션 요약
    pub summary: SessionSummary,
    /// 프로바이더에 전달된 이벤트 (전달 순서)
    pub events: Vec<DispatchedEvent>,
    /// 실험 ID → 배정된 변형
    pub variants: BTreeMap<String, String>,
    pub health: Vec<HealthCheckResult>,
    pub system: SystemMetrics,
    pub performance_score: Option<PerformanceScore>,
    pub resource_violations: Vec<String>,
    pub dashboard: DashboardSnapshot,
}

impl ReplayOutcome {
    pub fn event_names(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.name()).collect()
    }

    pub fn count_named(&self, name: &str) -> usize {
        self.events.iter().filter(|e| e.name() == name).count()
    }
}

/// 세션 타이머를 트레이스 시각에 맞춰 구동
struct TimerSchedule {
    heartbeat: Duration,
    poll: Duration,
    next_heartbeat: DateTime<Utc>,
    next_poll: DateTime<Utc>,
}

impl TimerSchedule {
    fn new(config: &AppConfig, start: DateTime<Utc>) -> Self {
        let heartbeat = Duration::milliseconds(config.session.heartbeat_interval_ms.max(1) as i64);
        let poll = Duration::milliseconds(config.session.inactivity_poll_ms.max(1) as i64);
        Self {
            heartbeat,
            poll,
            next_heartbeat: start + heartbeat,
            next_poll: start + poll,
        }
    }

    /// `target`까지 지나간 타이머 틱을 시각 순서대로 실행
    fn advance_to(&mut self, target: DateTime<Utc>, clock: &ManualClock, ctx: &TelemetryContext) {
        loop {
            let next = self.next_heartbeat.min(self.next_poll);
            if next > target {
                break;
            }
            clock.set(next);
            if next == self.next_poll {
                ctx.session().check_inactivity();
                self.next_poll += self.poll;
            }
            if next == self.next_heartbeat {
                ctx.session().heartbeat();
                self.next_heartbeat += self.heartbeat;
            }
        }
        clock.set(target);
    }
}

/// 트레이스 재생
///
/// 연결성 프로브 없이(오프라인) 실행한다. `store`는 세션 ID와 스냅샷을 보관한다.
pub async fn replay(
    trace: &Trace,
    config: AppConfig,
    store: Arc<dyn KeyValueStore>,
) -> Result<ReplayOutcome, CoreError> {
    trace.validate()?;

    let clock = Arc::new(match trace.started_at {
        Some(start) => ManualClock::new(start),
        None => ManualClock::at_epoch(),
    });
    let start = clock.now();

    let url = Url::parse(&trace.url).map_err(|e| CoreError::Validation {
        field: "url".to_string(),
        message: e.to_string(),
    })?;
    let env = Arc::new(StaticEnvironment::new(
        PageContext::new(url, trace.title.clone(), trace.referrer.clone()),
        trace.device.clone(),
    ));

    let hub = Arc::new(PerformanceHub::new(trace.capabilities, start));
    if let Some(timing) = trace.navigation {
        hub.set_navigation_timing(timing);
    }
    if let Some(memory) = trace.memory {
        hub.set_memory(memory);
    }

    let mut schedule = TimerSchedule::new(&config, start);
    let ctx = TelemetryContext::new(
        config,
        HostDeps {
            store,
            env: env.clone(),
            performance: hub.clone(),
            clock: clock.clone(),
            random: Arc::new(SeededRandom::new(trace.seed)),
            connectivity: None,
        },
    );
    let recorder = Arc::new(MemoryProvider::new());
    ctx.sink().add_provider(recorder.clone());

    info!(
        "트레이스 재생 시작: {} ({}단계)",
        trace.url,
        trace.steps.len()
    );
    ctx.start_observers();
    settle().await;

    let mut variants = BTreeMap::new();
    for step in &trace.steps {
        schedule.advance_to(start + Duration::milliseconds(step.at_ms), &clock, &ctx);
        debug!("재생 단계 +{}ms: {:?}", step.at_ms, step.action);
        apply(&step.action, &ctx, &env, &hub, &mut variants)?;
        settle().await;
    }

    let health = ctx.run_health_checks().await;
    let system = ctx.collect_system_metrics();
    let performance_score = ctx.performance_score();
    let resource_violations = ctx.check_resource_budget();

    ctx.shutdown().await;

    let outcome = ReplayOutcome {
        session_id: ctx.session().session_id(),
        summary: ctx.session().summary(),
        events: recorder.events(),
        variants,
        health,
        system,
        performance_score,
        resource_violations,
        dashboard: ctx.dashboard_snapshot(),
    };
    info!(
        "트레이스 재생 완료: 이벤트 {}건, 세션 이벤트 {}건",
        outcome.events.len(),
        outcome.summary.event_count
    );
    Ok(outcome)
}

fn apply(
    action: &TraceAction,
    ctx: &TelemetryContext,
    env: &StaticEnvironment,
    hub: &PerformanceHub,
    variants: &mut BTreeMap<String, String>,
) -> Result<(), CoreError> {
    match action {
        TraceAction::Entries { entries } => {
            let delivered = hub.record(entries.clone());
            debug!("엔트리 {}건 기록, 구독자 {delivered}곳 전달", entries.len());
        }
        TraceAction::PageView { url, title } => {
            if let Some(url) = url {
                env.navigate(url)?;
            }
            if let Some(title) = title {
                env.set_title(title.clone());
            }
            ctx.page_view();
        }
        TraceAction::Interaction {
            interaction,
            element,
        } => {
            ctx.session().record_interaction(*interaction);
            if let Some(element) = element {
                ctx.sink()
                    .track_interaction(element, interaction_action(*interaction));
            }
        }
        TraceAction::Visibility { hidden } => ctx.session().visibility_changed(*hidden),
        TraceAction::Conversion {
            conversion,
            value,
            test_id,
        } => {
            ctx.sink().track_conversion(conversion, *value);
            if let Some(test_id) = test_id {
                ctx.experiments()
                    .view(test_id, None)
                    .track_conversion(conversion, *value);
            }
        }
        TraceAction::Error {
            message,
            stack,
            boundary,
        } => {
            if *boundary {
                ctx.error_boundary()
                    .catch(message, stack.as_deref(), None);
            } else {
                ctx.sink().track_error(message, stack.as_deref(), None);
            }
        }
        TraceAction::Variant { test_id, user_id } => {
            if let Some(variant) = ctx.experiments().get_variant(test_id, user_id.as_deref()) {
                variants.insert(test_id.clone(), variant);
            }
        }
        TraceAction::Identify { user_id } => ctx.session().set_user_id(user_id),
        TraceAction::Memory(memory) => hub.set_memory(*memory),
    }
    Ok(())
}

fn interaction_action(kind: InteractionKind) -> &'static str {
    match kind {
        InteractionKind::Click => "click",
        InteractionKind::Scroll => "scroll",
        InteractionKind::Keydown => "keydown",
        InteractionKind::Mousemove => "mousemove",
    }
}

/// 관찰 태스크가 대기 중인 배치를 처리하도록 양보
async fn settle() {
    for _ in 0..SETTLE_YIELDS {
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_storage::memory::MemoryStore;

    const TRACE: &str = r#"{
        "url": "https://aiacademy.example.com/?utm_source=newsletter",
        "title": "AIacademy",
        "navigation": {"fetch_start": 0, "request_start": 20, "response_start": 120, "load_event_end": 1800},
        "seed": 42,
        "steps": [
            {"at_ms": 0, "action": {"type": "page_view"}},
            {"at_ms": 500, "action": {"type": "entries", "entries": [
                {"entry_type": "paint", "name": "first-contentful-paint", "start_time": 480},
                {"entry_type": "largest-contentful-paint", "start_time": 900}
            ]}},
            {"at_ms": 1500, "action": {"type": "interaction", "interaction": "click", "element": "hero-cta"}},
            {"at_ms": 2000, "action": {"type": "variant", "test_id": "hero_cta_test"}},
            {"at_ms": 2500, "action": {"type": "conversion", "conversion": "signup", "test_id": "hero_cta_test"}}
        ]
    }"#;

    fn config() -> AppConfig {
        let mut config = AppConfig::default_config();
        config.environment = academy_core::config::Environment::Production;
        config
    }

    #[tokio::test]
    async fn replay_produces_vitals_and_session_log() {
        let trace = Trace::from_json(TRACE).unwrap();
        let outcome = replay(&trace, config(), Arc::new(MemoryStore::new()))
            .await
            .unwrap();

        assert!(outcome.session_id.starts_with("session_"));
        assert_eq!(outcome.summary.page_views, 1);
        assert_eq!(outcome.count_named("page_view"), 1);
        assert_eq!(outcome.count_named("user_interaction"), 1);
        assert_eq!(outcome.count_named("ab_test_assignment"), 1);
        assert_eq!(outcome.count_named("ab_test_conversion"), 1);
        assert_eq!(outcome.count_named("session_ended"), 1);
        assert!(outcome.variants.contains_key("hero_cta_test"));

        // TTFB(동기) + FCP + LCP
        assert!(outcome.count_named("web_vital") >= 3);
        assert!(outcome.dashboard.vital(academy_core::models::vitals::MetricName::Ttfb).is_some());
        assert_eq!(outcome.performance_score.unwrap().score, 100);
    }

    #[tokio::test]
    async fn same_seed_same_assignment() {
        let trace = Trace::from_json(TRACE).unwrap();
        let first = replay(&trace, config(), Arc::new(MemoryStore::new()))
            .await
            .unwrap();
        let second = replay(&trace, config(), Arc::new(MemoryStore::new()))
            .await
            .unwrap();
        assert_eq!(first.variants, second.variants);
        assert_eq!(first.session_id, second.session_id);
    }

    #[tokio::test]
    async fn heartbeats_follow_trace_time() {
        let json = r#"{
            "url": "https://aiacademy.example.com/",
            "steps": [
                {"at_ms": 0, "action": {"type": "page_view"}},
                {"at_ms": 150000, "action": {"type": "interaction", "interaction": "scroll"}}
            ]
        }"#;
        let trace = Trace::from_json(json).unwrap();
        let outcome = replay(&trace, config(), Arc::new(MemoryStore::new()))
            .await
            .unwrap();
        assert_eq!(outcome.count_named("session_heartbeat"), 2);
        assert_eq!(outcome.count_named("session_inactive"), 0);
    }

    #[test]
    fn steps_must_not_go_backwards() {
        let json = r#"{
            "url": "https://aiacademy.example.com/",
            "steps": [
                {"at_ms": 100, "action": {"type": "page_view"}},
                {"at_ms": 50, "action": {"type": "page_view"}}
            ]
        }"#;
        let err = Trace::from_json(json).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let err = Trace::from_json(r#"{"url": "not a url"}"#).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }
}
