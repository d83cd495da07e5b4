//! # academy-seo
//!
//! 랜딩 페이지 SEO 도구.
//!
//! - [`types`] — 설정/지표/보고서 모델
//! - [`meta`] — `<head>` 모델과 메타 태그 upsert
//! - [`analyzer`] — HTML 문서 분석 (scraper)
//! - [`reporter`] — 지표 기반 점수와 개선 권고
//! - [`sitemap`] — 사이트맵 생성과 메타 문자열 유틸리티
//! - [`manager`] — 위 기능을 묶은 파사드

pub mod analyzer;
pub mod manager;
pub mod meta;
pub mod reporter;
pub mod sitemap;
pub mod types;

pub use manager::SeoManager;
