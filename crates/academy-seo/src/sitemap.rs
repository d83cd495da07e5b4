//! 사이트맵과 메타 문자열 유틸리티.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// 기본 사이트 이름
pub const SITE_NAME: &str = "AIacademy";
/// 메타 설명 최대 길이
pub const META_DESCRIPTION_MAX: usize = 160;

/// 사이트맵 대상 페이지 (사이트 기준 상대 경로)
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapPage {
    pub path: String,
    pub changefreq: String,
    pub priority: String,
}

impl SitemapPage {
    pub fn new(path: &str, changefreq: &str, priority: &str) -> Self {
        Self {
            path: path.to_string(),
            changefreq: changefreq.to_string(),
            priority: priority.to_string(),
        }
    }
}

/// 사이트맵 항목
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitemapEntry {
    pub url: String,
    pub changefreq: String,
    pub priority: String,
    pub lastmod: DateTime<Utc>,
}

/// 랜딩 사이트의 기본 페이지 목록
pub fn default_pages() -> Vec<SitemapPage> {
    vec![SitemapPage::new("/", "daily", "1.0")]
}

/// 절대 URL 사이트맵 항목 생성: `lastmod`는 모두 `now`
pub fn generate_sitemap(
    base_url: &str,
    pages: &[SitemapPage],
    now: DateTime<Utc>,
) -> Vec<SitemapEntry> {
    let base = base_url.trim_end_matches('/');
    pages
        .iter()
        .map(|page| SitemapEntry {
            url: format!("{base}{}", page.path),
            changefreq: page.changefreq.clone(),
            priority: page.priority.clone(),
            lastmod: now,
        })
        .collect()
}

/// `sitemap.xml` 본문
pub fn render_sitemap_xml(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        xml.push_str(&format!(
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{}</changefreq>\n    <priority>{}</priority>\n  </url>\n",
            entry.url.replace('&', "&amp;"),
            entry.lastmod.to_rfc3339_opts(SecondsFormat::Millis, true),
            entry.changefreq,
            entry.priority
        ));
    }
    xml.push_str("</urlset>\n");
    xml
}

/// 사이트 이름이 없으면 `"<title> | <site>"`
pub fn meta_title(title: &str, site_name: &str) -> String {
    if title.contains(site_name) {
        title.to_string()
    } else {
        format!("{title} | {site_name}")
    }
}

/// `max_len`자를 넘으면 `max_len - 3`자 + `...`
pub fn meta_description(description: &str, max_len: usize) -> String {
    if description.chars().count() <= max_len {
        return description.to_string();
    }
    let kept: String = description
        .chars()
        .take(max_len.saturating_sub(3))
        .collect();
    format!("{kept}...")
}

/// schema.org JSON-LD 객체
pub fn structured_data(schema_type: &str, data: Map<String, Value>) -> Value {
    let mut object = Map::new();
    object.insert(
        "@context".to_string(),
        Value::String("https://schema.org".to_string()),
    );
    object.insert("@type".to_string(), Value::String(schema_type.to_string()));
    object.extend(data);
    Value::Object(object)
}
