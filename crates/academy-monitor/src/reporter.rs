//! Web Vitals → 분석 이벤트 연결.
//!
//! 각 지표를 `web_vital` 이벤트로 보내고, LCP/FID/CLS는 예산과 비교해
//! 위반 시 `performance_budget_violation` 이벤트를 추가로 보낸다.

use academy_core::models::budget::BudgetKey;
use academy_core::models::event::EventKind;
use academy_core::models::vitals::{Metric, MetricName};
use academy_core::ports::analytics::EventSink;
use std::sync::Arc;
use tracing::{info, warn};

use crate::budget::PerformanceBudgetEvaluator;

/// 예산 검사 대상 지표의 예산 키
pub fn budget_key_for(name: MetricName) -> Option<BudgetKey> {
    match name {
        MetricName::Lcp => Some(BudgetKey::MaxLcp),
        MetricName::Fid => Some(BudgetKey::MaxFid),
        MetricName::Cls => Some(BudgetKey::MaxCls),
        MetricName::Fcp | MetricName::Ttfb => None,
    }
}

/// 지표 리포터
#[derive(Clone)]
pub struct VitalsReporter {
    sink: Arc<dyn EventSink>,
    evaluator: PerformanceBudgetEvaluator,
}

impl VitalsReporter {
    pub fn new(sink: Arc<dyn EventSink>, evaluator: PerformanceBudgetEvaluator) -> Self {
        Self { sink, evaluator }
    }

    pub fn report(&self, metric: &Metric) {
        info!("{}: {} ({})", metric.name, metric.value, metric.rating);

        self.sink.track(
            EventKind::WebVital {
                metric: metric.name,
                value: metric.value,
                rating: metric.rating,
                delta: metric.delta,
            }
            .into(),
        );

        let Some(key) = budget_key_for(metric.name) else {
            return;
        };
        let report = self.evaluator.check_metric(key, metric.value);
        if !report.passed {
            warn!("성능 예산 위반: {:?}", report.violations);
            self.sink.track(
                EventKind::PerformanceBudgetViolation {
                    metric: metric.name,
                    value: metric.value,
                    violations: report.violations,
                }
                .into(),
            );
        }
    }
}
