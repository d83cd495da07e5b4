//! SEO 모델.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 페이지 메타 설정
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeoConfig {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
    /// 기본값 `website`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_type: Option<String>,
    /// 기본값 `summary_large_image`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_card: Option<String>,
    /// JSON-LD 구조화 데이터
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_data: Option<serde_json::Value>,
}

/// 문서 분석 지표
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeoMetrics {
    /// 제목 글자 수
    pub title_length: usize,
    /// `meta[name=description]` 글자 수
    pub description_length: usize,
    /// 4글자 이상 단어별 출현 비율 (%)
    pub keyword_density: BTreeMap<String, f64>,
    /// 대체 텍스트가 있는 이미지 수
    pub image_alt_texts: usize,
    pub total_images: usize,
    pub internal_links: usize,
    pub external_links: usize,
    /// `h1`~`h6` 태그별 개수
    pub heading_structure: BTreeMap<String, usize>,
}

impl SeoMetrics {
    pub fn heading_count(&self, tag: &str) -> usize {
        self.heading_structure.get(tag).copied().unwrap_or(0)
    }
}

/// SEO 보고서
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoReport {
    /// 0~100
    pub score: u32,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}
