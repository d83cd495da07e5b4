//! 텔레메트리 컨텍스트.
//!
//! 프로세스(페이지) 단위 계측 컴포넌트를 한곳에서 생성/와이어링하고
//! 시작/종료 순서를 관리한다. 호스트 기능은 [`HostDeps`]의 포트로 주입한다.
//!
//! 생성 순서: 분석 싱크 → 세션 추적기 → A/B 레지스트리 → 캐시/플래그 →
//! 헬스 체커 → 에러 바운더리. [`TelemetryContext::start`]가 관찰 채널과 타이머를 켜고,
//! [`TelemetryContext::shutdown`]이 언로드 이벤트를 남긴 뒤 모두 정지한다.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use academy_analytics::error_boundary::ErrorBoundary;
use academy_analytics::providers::ConsoleProvider;
use academy_analytics::session::SessionTracker;
use academy_analytics::sink::AnalyticsSink;
use academy_core::config::AppConfig;
use academy_core::handle::TaskHandle;
use academy_core::models::budget::PerformanceScore;
use academy_core::models::event::{AnalyticsEvent, EventKind};
use academy_core::models::health::{HealthCheckResult, HealthStatus, SystemMetrics};
use academy_core::ports::analytics::EventSink;
use academy_core::ports::clock::Clock;
use academy_core::ports::environment::HostEnvironment;
use academy_core::ports::health::ConnectivityClient;
use academy_core::ports::performance::PerformanceSource;
use academy_core::ports::random::RandomSource;
use academy_core::ports::storage::KeyValueStore;
use academy_experiment::registry::{hero_cta_test, AbTestRegistry};
use academy_experiment::store::AssignmentStore;
use academy_monitor::budget::PerformanceBudgetEvaluator;
use academy_monitor::health::{
    overall_health, ConnectivityProbe, HealthChecker, LoadTimeProbe, StorageProbe,
};
use academy_monitor::metrics::SystemMetricsCollector;
use academy_monitor::reporter::VitalsReporter;
use academy_monitor::resource::ResourceWatcher;
use academy_monitor::vitals::VitalsCollector;
use academy_storage::flags::FeatureFlags;
use academy_storage::memo::CacheRegistry;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::dashboard::{is_visible, DashboardSnapshot, DashboardState};

/// 호스트가 제공하는 포트 묶음
#[derive(Clone)]
pub struct HostDeps {
    pub store: Arc<dyn KeyValueStore>,
    pub env: Arc<dyn HostEnvironment>,
    pub performance: Arc<dyn PerformanceSource>,
    pub clock: Arc<dyn Clock>,
    pub random: Arc<dyn RandomSource>,
    /// 없으면 연결성 프로브를 등록하지 않는다
    pub connectivity: Option<Arc<dyn ConnectivityClient>>,
}

/// 페이지 단위 계측 컨텍스트
pub struct TelemetryContext {
    config: AppConfig,
    env: Arc<dyn HostEnvironment>,
    performance: Arc<dyn PerformanceSource>,
    clock: Arc<dyn Clock>,
    sink: Arc<AnalyticsSink>,
    session: Arc<SessionTracker>,
    experiments: AbTestRegistry,
    caches: CacheRegistry,
    flags: FeatureFlags,
    health: HealthChecker,
    budget: PerformanceBudgetEvaluator,
    error_boundary: ErrorBoundary,
    dashboard: Arc<DashboardState>,
    system: Mutex<SystemMetricsCollector>,
    handles: Mutex<Vec<TaskHandle>>,
    closed: AtomicBool,
}

impl TelemetryContext {
    /// 컴포넌트 생성: 백그라운드 작업은 [`start`](Self::start) 전까지 돌지 않는다
    pub fn new(config: AppConfig, deps: HostDeps) -> Self {
        let HostDeps {
            store,
            env,
            performance,
            clock,
            random,
            connectivity,
        } = deps;

        // 1. 분석 싱크
        let sink = Arc::new(AnalyticsSink::new(env.clone(), clock.clone()));
        if config.environment.is_development() {
            sink.add_provider(Arc::new(ConsoleProvider));
        }
        let events: Arc<dyn EventSink> = sink.clone();

        // 2. 세션 추적기
        let session = Arc::new(SessionTracker::new(
            config.session,
            store.clone(),
            env.clone(),
            clock.clone(),
            random.as_ref(),
            events.clone(),
        ));

        // 3. A/B 실험
        let assignments = if config.experiment.persist_assignments {
            AssignmentStore::persistent(store.clone())
        } else {
            AssignmentStore::in_memory()
        };
        let experiments =
            AbTestRegistry::new(assignments, random.clone(), events.clone(), store.clone());
        experiments.register_test(hero_cta_test(clock.now()));

        // 4. 캐시 / 플래그
        let caches = CacheRegistry::new(&config.cache, clock.clone());
        let flags = FeatureFlags::new(store.clone());
        if flags.maintenance_mode() {
            warn!("점검 모드 플래그가 켜져 있음");
        }

        // 5. 헬스 체커
        let mut health = HealthChecker::new(clock.clone());
        if let Some(client) = connectivity {
            let url = config
                .health
                .connectivity_url
                .clone()
                .unwrap_or_else(|| env.page().origin());
            debug!("연결성 프로브 대상: {url}");
            health.register_check(
                "connectivity",
                Arc::new(ConnectivityProbe::new(client, url, clock.clone())),
            );
        }
        health.register_check(
            "performance",
            Arc::new(LoadTimeProbe::new(
                performance.clone(),
                config.health.load_warning_ms as f64,
                config.health.load_critical_ms as f64,
                clock.clone(),
            )),
        );
        health.register_check(
            "storage",
            Arc::new(StorageProbe::new(store.clone(), clock.clone())),
        );

        // 6. 에러 바운더리
        let error_boundary = ErrorBoundary::new(
            events,
            clock.clone(),
            random,
            config.error_boundary.max_retries,
        );

        let budget = PerformanceBudgetEvaluator::new(config.budget);
        let system = SystemMetricsCollector::new(performance.clone(), clock.clone());

        info!(
            "텔레메트리 컨텍스트 생성: 세션 {}, 환경 {:?}",
            session.session_id(),
            config.environment
        );

        Self {
            config,
            env,
            performance,
            clock,
            sink,
            session,
            experiments,
            caches,
            flags,
            health,
            budget,
            error_boundary,
            dashboard: Arc::new(DashboardState::new()),
            system: Mutex::new(system),
            handles: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// 관찰 채널과 세션 타이머 시작 (중복 호출은 무시)
    ///
    /// tokio 런타임 안에서 호출해야 한다.
    pub fn start(&self) {
        self.start_observers();
        self.session.start_timers();
    }

    /// 성능 관찰 채널만 시작: 세션 타이머는 호출자가 직접 구동
    pub fn start_observers(&self) {
        let mut handles = self.handles.lock();
        if !handles.is_empty() {
            debug!("텔레메트리 이미 시작됨");
            return;
        }

        let reporter = VitalsReporter::new(self.events(), self.budget);
        let dashboard = self.dashboard.clone();
        handles.push(
            VitalsCollector::new(self.performance.clone(), self.config.vitals).start(
                move |metric| {
                    dashboard.record_metric(&metric);
                    reporter.report(&metric);
                },
            ),
        );

        handles.push(
            ResourceWatcher::new(self.performance.clone(), self.events(), self.config.monitor)
                .start(),
        );
        info!("텔레메트리 시작 ({}개 구독)", handles.len());
    }

    /// 현재 페이지 조회 기록 (분석 이벤트 + 세션 로그)
    pub fn page_view(&self) {
        let page = self.env.page();
        self.sink.track_page_view(page.path());
        self.session.track_page_view();
    }

    /// 등록된 프로브 실행, 대시보드 갱신, `health_report` 기록
    pub async fn run_health_checks(&self) -> Vec<HealthCheckResult> {
        let results = self.health.run_all_checks().await;
        let overall = overall_health(&results);
        let critical = results
            .iter()
            .filter(|r| r.status == HealthStatus::Critical)
            .count();

        if overall == HealthStatus::Healthy {
            info!("헬스 체크 완료: {overall}");
        } else {
            warn!("헬스 체크 완료: {overall} (critical {critical}개)");
        }

        self.sink.track(AnalyticsEvent::new(EventKind::HealthReport {
            overall,
            checks: results.len(),
            critical,
        }));
        self.dashboard.record_health(results.clone());
        results
    }

    /// 시스템 메트릭 수집 (에러율은 싱크 집계값)
    pub fn collect_system_metrics(&self) -> SystemMetrics {
        let metrics = self.system.lock().collect(self.sink.error_rate());
        self.dashboard.record_system(metrics.clone());
        metrics
    }

    /// 로드 시간 기준 성능 점수 (타이밍이 없으면 None)
    pub fn performance_score(&self) -> Option<PerformanceScore> {
        self.budget.performance_score(self.performance.as_ref())
    }

    /// 버퍼된 리소스 타임라인의 크기 예산 위반
    pub fn check_resource_budget(&self) -> Vec<String> {
        let violations = self.budget.monitor_resource_sizes(self.performance.as_ref());
        for violation in &violations {
            warn!("리소스 예산 초과: {violation}");
        }
        violations
    }

    /// 노출 조건을 만족할 때만 대시보드 스냅샷
    pub fn dashboard(&self) -> Option<DashboardSnapshot> {
        if is_visible(self.config.environment, &self.flags) {
            Some(self.dashboard_snapshot())
        } else {
            None
        }
    }

    /// 노출 조건과 무관한 스냅샷
    pub fn dashboard_snapshot(&self) -> DashboardSnapshot {
        self.dashboard.snapshot(self.clock.now())
    }

    /// 언로드 기록 후 모든 구독/타이머 정지 (두 번째 호출부터는 무시)
    pub async fn shutdown(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        self.session.page_unload();
        self.session.destroy();

        let handles: Vec<TaskHandle> = std::mem::take(&mut *self.handles.lock());
        for handle in handles {
            handle.shutdown().await;
        }
        info!("텔레메트리 종료: 세션 {}", self.session.session_id());
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    // ============================================================
    // 컴포넌트 접근자
    // ============================================================

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn sink(&self) -> &Arc<AnalyticsSink> {
        &self.sink
    }

    /// 싱크를 포트 타입으로
    pub fn events(&self) -> Arc<dyn EventSink> {
        self.sink.clone()
    }

    pub fn session(&self) -> &Arc<SessionTracker> {
        &self.session
    }

    pub fn experiments(&self) -> &AbTestRegistry {
        &self.experiments
    }

    pub fn caches(&self) -> &CacheRegistry {
        &self.caches
    }

    pub fn flags(&self) -> &FeatureFlags {
        &self.flags
    }

    pub fn health(&self) -> &HealthChecker {
        &self.health
    }

    pub fn error_boundary(&self) -> &ErrorBoundary {
        &self.error_boundary
    }

    pub fn budget(&self) -> &PerformanceBudgetEvaluator {
        &self.budget
    }
}
