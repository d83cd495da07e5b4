//! 녹화된 랜딩 페이지 트레이스 재생 통합 테스트.

use std::path::PathBuf;
use std::sync::Arc;

use academy_app::replay::{replay, ReplayOutcome, Trace};
use academy_core::config::{AppConfig, Environment};
use academy_core::models::health::HealthStatus;
use academy_core::models::vitals::{MetricName, Rating};
use academy_storage::memory::MemoryStore;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/landing_trace.json")
}

async fn run() -> ReplayOutcome {
    let trace = Trace::load(&fixture()).unwrap();
    let mut config = AppConfig::default_config();
    config.environment = Environment::Production;
    replay(&trace, config, Arc::new(MemoryStore::new()))
        .await
        .unwrap()
}

#[tokio::test]
async fn vitals_are_graded_and_budgeted() {
    let outcome = run().await;

    // TTFB, FCP, LCP x2, CLS, FID
    assert_eq!(outcome.count_named("web_vital"), 6);
    // 두 번째 LCP(2900ms)만 maxLCP 초과
    assert_eq!(outcome.count_named("performance_budget_violation"), 1);

    let dashboard = &outcome.dashboard;
    let lcp = dashboard.vital(MetricName::Lcp).unwrap();
    assert_eq!(lcp.value, 2900.0);
    assert_eq!(lcp.rating, Rating::NeedsImprovement);
    assert_eq!(dashboard.vital(MetricName::Ttfb).unwrap().value, 150.0);
    assert_eq!(dashboard.vital(MetricName::Fid).unwrap().value, 35.0);
    assert_eq!(dashboard.vital(MetricName::Fcp).unwrap().value, 410.0);
}

#[tokio::test]
async fn resources_and_long_tasks_are_flagged() {
    let outcome = run().await;
    assert_eq!(outcome.count_named("large_resource_detected"), 1);
    assert_eq!(outcome.count_named("long_task"), 1);
    assert_eq!(
        outcome.resource_violations,
        vec!["Image https://aiacademy.example.com/hero.png is 400.00KB (budget: 200KB)"]
    );
}

#[tokio::test]
async fn session_follows_trace_time() {
    let outcome = run().await;

    assert_eq!(outcome.summary.page_views, 2);
    // 60초 하트비트만 활성 상태였고 이후는 숨김 상태
    assert_eq!(outcome.count_named("session_heartbeat"), 1);
    assert_eq!(outcome.count_named("session_inactive"), 0);
    assert_eq!(outcome.count_named("session_ended"), 1);
    assert_eq!(outcome.summary.duration_ms, 215_000);
    assert!(outcome.summary.is_active);
}

#[tokio::test]
async fn experiment_and_conversion() {
    let outcome = run().await;
    let variant = outcome.variants.get("hero_cta_test").unwrap();
    assert!(variant == "control" || variant == "variant_a");
    assert_eq!(outcome.count_named("ab_test_assignment"), 1);
    assert_eq!(outcome.count_named("ab_test_conversion"), 1);
    assert_eq!(outcome.count_named("conversion"), 1);
}

#[tokio::test]
async fn health_and_system_metrics() {
    let outcome = run().await;

    // 로드 3400ms → performance warning, 저장소 healthy
    assert_eq!(outcome.dashboard.overall, Some(HealthStatus::Warning));
    assert_eq!(outcome.health.len(), 2);
    assert_eq!(outcome.performance_score.as_ref().unwrap().score, 80);

    assert_eq!(outcome.system.memory_usage, 50.0);
    assert_eq!(outcome.system.network_latency_ms, 150.0);
    assert_eq!(outcome.system.performance_score, 0.0);
    assert!(outcome.system.error_rate > 0.0);
    assert_eq!(outcome.count_named("error_boundary_triggered"), 1);
}

#[tokio::test]
async fn dispatched_events_carry_page_context() {
    let outcome = run().await;
    let first = &outcome.events[0];
    assert_eq!(first.url, "https://aiacademy.example.com/?utm_source=newsletter");
    assert_eq!(first.user_agent, "Mozilla/5.0 (X11; Linux x86_64)");
    assert_eq!(first.referrer, "https://news.example.org/");

    let last_page_view = outcome
        .events
        .iter()
        .rev()
        .find(|e| e.name() == "page_view")
        .unwrap();
    assert_eq!(last_page_view.url, "https://aiacademy.example.com/courses");
}

#[tokio::test]
async fn replay_is_deterministic() {
    let a = run().await;
    let b = run().await;
    assert_eq!(a.session_id, b.session_id);
    assert_eq!(a.variants, b.variants);
    assert_eq!(a.event_names(), b.event_names());
}
