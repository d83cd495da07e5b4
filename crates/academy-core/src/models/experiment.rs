//! A/B 테스트 모델.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 실험 변형
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    /// 표시 이름 (예: CTA 문구)
    pub name: String,
    /// 가중치 (0 이상)
    pub weight: f64,
}

impl Variant {
    pub fn new(id: impl Into<String>, name: impl Into<String>, weight: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            weight,
        }
    }
}

/// 실험 정의
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbTest {
    pub id: String,
    pub name: String,
    /// 선언 순서가 배정 순서
    pub variants: Vec<Variant>,
    pub is_active: bool,
    pub start_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

impl AbTest {
    /// 가중치 합
    pub fn total_weight(&self) -> f64 {
        self.variants.iter().map(|v| v.weight).sum()
    }

    pub fn variant(&self, variant_id: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }
}

/// 배정 키의 익명 사용자 표기
pub const ANONYMOUS_USER: &str = "anonymous";

/// 배정 키 `(testId, userId ?? "anonymous")` 직렬화
pub fn assignment_key(test_id: &str, user_id: Option<&str>) -> String {
    format!("{}_{}", test_id, user_id.unwrap_or(ANONYMOUS_USER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_weight_sums_variants() {
        let test = AbTest {
            id: "hero_cta_test".to_string(),
            name: "Hero CTA".to_string(),
            variants: vec![
                Variant::new("control", "Start Learning Today", 50.0),
                Variant::new("variant_a", "Begin Your AI Journey", 50.0),
            ],
            is_active: true,
            start_date: Utc::now(),
            end_date: None,
        };
        assert_eq!(test.total_weight(), 100.0);
        assert!(test.variant("variant_a").is_some());
        assert!(test.variant("missing").is_none());
    }

    #[test]
    fn assignment_key_defaults_to_anonymous() {
        assert_eq!(assignment_key("t1", None), "t1_anonymous");
        assert_eq!(assignment_key("t1", Some("u42")), "t1_u42");
    }
}
