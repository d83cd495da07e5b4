//! HTML 문서 SEO 분석.
//!
//! `scraper`로 문서를 파싱해 제목/설명 길이, 키워드 밀도, 이미지 대체 텍스트,
//! 내부/외부 링크, 헤딩 구조를 집계한다.

use std::collections::BTreeMap;

use academy_core::error::CoreError;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

use crate::types::SeoMetrics;

/// 키워드로 세는 최소 글자 수 (초과)
const MIN_KEYWORD_CHARS: usize = 3;

/// 본문 텍스트에서 제외하는 태그
const SKIP_TEXT: &[&str] = &["script", "style", "noscript", "template"];

const HEADINGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// 문서 분석기: 내부 링크 판정에 사이트 origin을 쓴다
#[derive(Debug, Clone)]
pub struct SeoAnalyzer {
    origin: String,
}

impl SeoAnalyzer {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn analyze(&self, html: &str) -> Result<SeoMetrics, CoreError> {
        let document = Html::parse_document(html);

        let title = document
            .select(&selector("title")?)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .unwrap_or_default();

        let description = document
            .select(&selector(r#"meta[name="description"]"#)?)
            .next()
            .and_then(|el| el.value().attr("content"))
            .unwrap_or_default();

        let body_text = match document.select(&selector("body")?).next() {
            Some(body) => visible_text(body),
            None => visible_text(document.root_element()),
        };

        let mut total_images = 0;
        let mut image_alt_texts = 0;
        for img in document.select(&selector("img")?) {
            total_images += 1;
            if img
                .value()
                .attr("alt")
                .is_some_and(|alt| !alt.trim().is_empty())
            {
                image_alt_texts += 1;
            }
        }

        let mut internal_links = 0;
        let mut external_links = 0;
        for link in document.select(&selector("a[href]")?) {
            let href = link.value().attr("href").unwrap_or_default();
            if href.starts_with('/') || href.starts_with(&self.origin) {
                internal_links += 1;
            } else if href.starts_with("http") {
                external_links += 1;
            }
        }

        let mut heading_structure = BTreeMap::new();
        for heading in document.select(&selector(&HEADINGS.join(", "))?) {
            let tag = heading.value().name().to_ascii_lowercase();
            *heading_structure.entry(tag).or_insert(0) += 1;
        }

        let metrics = SeoMetrics {
            title_length: title.chars().count(),
            description_length: description.chars().count(),
            keyword_density: keyword_density(&body_text),
            image_alt_texts,
            total_images,
            internal_links,
            external_links,
            heading_structure,
        };
        debug!(
            "SEO 분석: 제목 {}자, 설명 {}자, 키워드 {}개",
            metrics.title_length,
            metrics.description_length,
            metrics.keyword_density.len()
        );
        Ok(metrics)
    }
}

/// 단어별 출현 비율 (%): 분모는 전체 단어 수
pub fn keyword_density(text: &str) -> BTreeMap<String, f64> {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for word in &words {
        if word.chars().count() > MIN_KEYWORD_CHARS {
            *counts.entry((*word).to_string()).or_insert(0) += 1;
        }
    }

    let total = words.len() as f64;
    counts
        .into_iter()
        .map(|(word, count)| (word, count as f64 / total * 100.0))
        .collect()
}

fn selector(css: &str) -> Result<Selector, CoreError> {
    Selector::parse(css)
        .map_err(|e| CoreError::Internal(format!("셀렉터 파싱 실패 {css}: {e}")))
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 스크립트/스타일을 제외한 텍스트 노드를 공백으로 이어붙인다
fn visible_text(root: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_text(root, &mut out);
    out
}

fn push_text(el: ElementRef<'_>, out: &mut String) {
    if SKIP_TEXT.contains(&el.value().name()) {
        return;
    }
    for child in el.children() {
        match child.value() {
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    push_text(child_el, out);
                }
            }
            Node::Text(text) => {
                out.push(' ');
                out.push_str(&text.text);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
    <html>
        <head>
            <title>  AIacademy
                Learn AI  </title>
            <meta name="description" content="Hands-on courses">
        </head>
        <body>
            <h1>Learning paths</h1>
            <h2>Courses</h2><h2>Mentors</h2>
            <p>Python python basics for everyone</p>
            <img src="/hero.png" alt="Hero">
            <img src="/diagram.png" alt="  ">
            <img src="/logo.png">
            <a href="/courses">Courses</a>
            <a href="https://aiacademy.example.com/pricing">Pricing</a>
            <a href="https://github.com/aiacademy">GitHub</a>
            <a href="mailto:hello@aiacademy.example.com">Mail</a>
            <script>var trackingSecret = "hidden";</script>
        </body>
    </html>
    "#;

    #[test]
    fn analyzes_document_structure() {
        let analyzer = SeoAnalyzer::new("https://aiacademy.example.com");
        let metrics = analyzer.analyze(PAGE).unwrap();

        assert_eq!(metrics.title_length, "AIacademy Learn AI".len());
        assert_eq!(metrics.description_length, 16);
        assert_eq!(metrics.total_images, 3);
        assert_eq!(metrics.image_alt_texts, 1);
        assert_eq!(metrics.internal_links, 2);
        assert_eq!(metrics.external_links, 1);
        assert_eq!(metrics.heading_count("h1"), 1);
        assert_eq!(metrics.heading_count("h2"), 2);
        assert_eq!(metrics.heading_count("h3"), 0);
    }

    #[test]
    fn script_text_is_not_a_keyword() {
        let metrics = SeoAnalyzer::new("https://aiacademy.example.com")
            .analyze(PAGE)
            .unwrap();
        assert!(metrics.keyword_density.contains_key("python"));
        assert!(!metrics.keyword_density.keys().any(|k| k.contains("tracking")));
    }

    #[test]
    fn density_is_percentage_of_all_words() {
        let density = keyword_density("Learn learn AI with code");
        // 5단어 중 learn 2회
        assert_eq!(density["learn"], 40.0);
        assert_eq!(density["with"], 20.0);
        assert!(!density.contains_key("ai"));
    }

    #[test]
    fn missing_head_yields_zero_lengths() {
        let metrics = SeoAnalyzer::new("https://aiacademy.example.com")
            .analyze("<p>bare</p>")
            .unwrap();
        assert_eq!(metrics.title_length, 0);
        assert_eq!(metrics.description_length, 0);
        assert!(metrics.heading_structure.is_empty());
    }
}
