//! 지표 등급 분류.

use academy_core::config::VitalsConfig;
use academy_core::models::vitals::{MetricName, Rating, Thresholds};

/// `value <= good` → good, `value <= poor` → needs-improvement, 그 외 poor
pub fn classify(value: f64, thresholds: Thresholds) -> Rating {
    if value <= thresholds.good {
        Rating::Good
    } else if value <= thresholds.poor {
        Rating::NeedsImprovement
    } else {
        Rating::Poor
    }
}

/// 설정된 임계값 테이블로 지표 분류
pub fn classify_metric(name: MetricName, value: f64, table: &VitalsConfig) -> Rating {
    classify(value, table.thresholds_for(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_inclusive() {
        let t = Thresholds::new(2500.0, 4000.0);
        assert_eq!(classify(0.0, t), Rating::Good);
        assert_eq!(classify(2500.0, t), Rating::Good);
        assert_eq!(classify(2500.001, t), Rating::NeedsImprovement);
        assert_eq!(classify(4000.0, t), Rating::NeedsImprovement);
        assert_eq!(classify(4001.0, t), Rating::Poor);
    }

    #[test]
    fn monotone_over_default_table() {
        let table = VitalsConfig::default();
        for name in MetricName::ALL {
            let t = table.thresholds_for(name);
            let eps = t.good * 1e-6;
            assert_eq!(classify_metric(name, t.good, &table), Rating::Good);
            assert_eq!(
                classify_metric(name, t.good + eps, &table),
                Rating::NeedsImprovement
            );
            assert_eq!(classify_metric(name, t.poor + 1.0, &table), Rating::Poor);
        }
    }

    #[test]
    fn cls_uses_fractional_thresholds() {
        let table = VitalsConfig::default();
        assert_eq!(classify_metric(MetricName::Cls, 0.05, &table), Rating::Good);
        assert_eq!(
            classify_metric(MetricName::Cls, 0.2, &table),
            Rating::NeedsImprovement
        );
        assert_eq!(classify_metric(MetricName::Cls, 0.3, &table), Rating::Poor);
    }
}
