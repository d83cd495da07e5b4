//! 성능 예산 평가.
//!
//! 지표 묶음을 고정 예산과 비교해 위반 메시지를 만들고,
//! 내비게이션 로드 시간으로 0~100 점수를 산출한다.

use academy_core::models::budget::{BudgetKey, BudgetReport, PerformanceBudget, PerformanceScore};
use academy_core::models::vitals::{EntryDetail, EntryType};
use academy_core::ports::performance::PerformanceSource;
use tracing::{debug, warn};

/// 위반 1건당 감점
const PENALTY_PER_VIOLATION: u32 = 20;

/// 성능 예산 평가기
#[derive(Debug, Clone, Copy)]
pub struct PerformanceBudgetEvaluator {
    budget: PerformanceBudget,
}

impl PerformanceBudgetEvaluator {
    pub fn new(budget: PerformanceBudget) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> &PerformanceBudget {
        &self.budget
    }

    /// 예산 검사
    ///
    /// 예산 테이블에 있는 키만 비교하고 나머지는 무시한다.
    /// 메시지 형식: `"<key>: <value> exceeds budget of <budget>"`
    pub fn check_budget<I, K>(&self, metrics: I) -> BudgetReport
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let violations: Vec<String> = metrics
            .into_iter()
            .filter_map(|(key, value)| {
                let key = key.as_ref();
                let budget_value = self.budget.value_of(BudgetKey::parse(key)?);
                (value > budget_value)
                    .then(|| format!("{key}: {value} exceeds budget of {budget_value}"))
            })
            .collect();

        BudgetReport {
            passed: violations.is_empty(),
            violations,
        }
    }

    /// 단일 항목 검사
    pub fn check_metric(&self, key: BudgetKey, value: f64) -> BudgetReport {
        self.check_budget([(key.as_str(), value)])
    }

    /// 내비게이션 로드 시간 기반 점수 (타이밍이 없으면 None)
    pub fn performance_score(&self, source: &dyn PerformanceSource) -> Option<PerformanceScore> {
        let timing = source.navigation_timing()?;
        let load_time = timing.load_time();
        let report = self.check_metric(BudgetKey::MaxLoadTime, load_time);
        let score = score_for(report.violations.len());
        debug!("성능 점수: {score} (로드 {load_time}ms)");

        Some(PerformanceScore {
            score,
            load_time,
            violations: report.violations,
        })
    }

    /// 버퍼된 리소스 타임라인에서 이미지/스크립트 크기 예산 위반 탐색
    pub fn monitor_resource_sizes(&self, source: &dyn PerformanceSource) -> Vec<String> {
        let mut violations = Vec::new();

        for entry in source.entries_by_type(EntryType::Resource) {
            let EntryDetail::Resource {
                transfer_size,
                ref initiator_type,
            } = entry.detail
            else {
                continue;
            };
            if transfer_size == 0 {
                continue;
            }

            let size_kb = transfer_size as f64 / 1024.0;
            match initiator_type.as_str() {
                "img" if size_kb > self.budget.max_image_size => violations.push(format!(
                    "Image {} is {size_kb:.2}KB (budget: {}KB)",
                    entry.name, self.budget.max_image_size
                )),
                "script" if size_kb > self.budget.max_bundle_size => violations.push(format!(
                    "Script {} is {size_kb:.2}KB (budget: {}KB)",
                    entry.name, self.budget.max_bundle_size
                )),
                _ => {}
            }
        }

        if !violations.is_empty() {
            warn!("리소스 크기 예산 위반 {}건: {:?}", violations.len(), violations);
        }
        violations
    }
}

impl Default for PerformanceBudgetEvaluator {
    fn default() -> Self {
        Self::new(PerformanceBudget::default())
    }
}

/// `max(0, 100 - 20 * violations)`
pub fn score_for(violations: usize) -> u32 {
    let penalty = u32::try_from(violations)
        .unwrap_or(u32::MAX)
        .saturating_mul(PENALTY_PER_VIOLATION);
    100u32.saturating_sub(penalty)
}
