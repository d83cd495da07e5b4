//! SEO 점수 보고.
//!
//! 100점에서 시작해 항목별로 감점하고, 감점과 무관한 개선 권고를 덧붙인다.

use std::ops::RangeInclusive;

use crate::types::{SeoMetrics, SeoReport};

const TITLE_RANGE: RangeInclusive<usize> = 30..=60;
const DESCRIPTION_RANGE: RangeInclusive<usize> = 120..=160;
const MIN_INTERNAL_LINKS: usize = 3;
const MIN_KEYWORDS: usize = 10;

const TITLE_PENALTY: u32 = 10;
const DESCRIPTION_PENALTY: u32 = 10;
const ALT_TEXT_PENALTY: u32 = 15;
const H1_PENALTY: u32 = 10;

pub const ISSUE_TITLE_LENGTH: &str = "Title length is not optimal (30-60 characters recommended)";
pub const ISSUE_DESCRIPTION_LENGTH: &str =
    "Meta description length is not optimal (120-160 characters recommended)";
pub const ISSUE_MISSING_ALT: &str = "Some images are missing alt text";
pub const ISSUE_H1_COUNT: &str = "Page should have exactly one H1 tag";
pub const RECOMMEND_INTERNAL_LINKS: &str =
    "Consider adding more internal links to improve site structure";
pub const RECOMMEND_KEYWORDS: &str =
    "Consider expanding content to include more relevant keywords";

/// 지표로 보고서 생성
pub fn generate_report(metrics: &SeoMetrics) -> SeoReport {
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();
    let mut penalty = 0u32;

    if !TITLE_RANGE.contains(&metrics.title_length) {
        issues.push(ISSUE_TITLE_LENGTH.to_string());
        penalty += TITLE_PENALTY;
    }

    if !DESCRIPTION_RANGE.contains(&metrics.description_length) {
        issues.push(ISSUE_DESCRIPTION_LENGTH.to_string());
        penalty += DESCRIPTION_PENALTY;
    }

    if metrics.total_images > 0 && metrics.image_alt_texts < metrics.total_images {
        issues.push(ISSUE_MISSING_ALT.to_string());
        penalty += ALT_TEXT_PENALTY;
    }

    if metrics.heading_count("h1") != 1 {
        issues.push(ISSUE_H1_COUNT.to_string());
        penalty += H1_PENALTY;
    }

    if metrics.internal_links < MIN_INTERNAL_LINKS {
        recommendations.push(RECOMMEND_INTERNAL_LINKS.to_string());
    }

    if metrics.keyword_density.len() < MIN_KEYWORDS {
        recommendations.push(RECOMMEND_KEYWORDS.to_string());
    }

    SeoReport {
        score: 100u32.saturating_sub(penalty),
        issues,
        recommendations,
    }
}
