//! 성능 예산 모델.

use serde::{Deserialize, Serialize};

/// 성능 예산 항목 키
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BudgetKey {
    #[serde(rename = "maxLoadTime")]
    MaxLoadTime,
    #[serde(rename = "maxBundleSize")]
    MaxBundleSize,
    #[serde(rename = "maxImageSize")]
    MaxImageSize,
    #[serde(rename = "maxLCP")]
    MaxLcp,
    #[serde(rename = "maxFID")]
    MaxFid,
    #[serde(rename = "maxCLS")]
    MaxCls,
}

impl BudgetKey {
    pub const ALL: [BudgetKey; 6] = [
        BudgetKey::MaxLoadTime,
        BudgetKey::MaxBundleSize,
        BudgetKey::MaxImageSize,
        BudgetKey::MaxLcp,
        BudgetKey::MaxFid,
        BudgetKey::MaxCls,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetKey::MaxLoadTime => "maxLoadTime",
            BudgetKey::MaxBundleSize => "maxBundleSize",
            BudgetKey::MaxImageSize => "maxImageSize",
            BudgetKey::MaxLcp => "maxLCP",
            BudgetKey::MaxFid => "maxFID",
            BudgetKey::MaxCls => "maxCLS",
        }
    }

    /// 문자열 키 해석: 예산 테이블에 없는 키는 None
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

/// 고정 성능 예산
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceBudget {
    /// 페이지 로드 시간 상한 (밀리초)
    pub max_load_time: f64,
    /// 번들 크기 상한 (KB)
    pub max_bundle_size: f64,
    /// 이미지 크기 상한 (KB)
    pub max_image_size: f64,
    /// LCP 상한 (밀리초)
    pub max_lcp: f64,
    /// FID 상한 (밀리초)
    pub max_fid: f64,
    /// CLS 점수 상한
    pub max_cls: f64,
}

impl PerformanceBudget {
    pub fn value_of(&self, key: BudgetKey) -> f64 {
        match key {
            BudgetKey::MaxLoadTime => self.max_load_time,
            BudgetKey::MaxBundleSize => self.max_bundle_size,
            BudgetKey::MaxImageSize => self.max_image_size,
            BudgetKey::MaxLcp => self.max_lcp,
            BudgetKey::MaxFid => self.max_fid,
            BudgetKey::MaxCls => self.max_cls,
        }
    }
}

impl Default for PerformanceBudget {
    fn default() -> Self {
        Self {
            max_load_time: 3000.0,
            max_bundle_size: 512.0,
            max_image_size: 200.0,
            max_lcp: 2500.0,
            max_fid: 100.0,
            max_cls: 0.1,
        }
    }
}

/// 예산 검사 결과
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetReport {
    pub passed: bool,
    pub violations: Vec<String>,
}

/// 로드 시간 기반 성능 점수
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceScore {
    /// 0 ~ 100
    pub score: u32,
    /// 평가에 사용된 로드 시간 (밀리초)
    pub load_time: f64,
    pub violations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_parse_roundtrip() {
        for key in BudgetKey::ALL {
            assert_eq!(BudgetKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(BudgetKey::parse("pageLoadTime"), None);
    }

    #[test]
    fn default_budget_values() {
        let budget = PerformanceBudget::default();
        assert_eq!(budget.value_of(BudgetKey::MaxLcp), 2500.0);
        assert_eq!(budget.value_of(BudgetKey::MaxCls), 0.1);
    }
}
