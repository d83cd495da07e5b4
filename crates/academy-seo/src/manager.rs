//! SEO 파사드.

use academy_core::error::CoreError;
use tracing::info;

use crate::analyzer::SeoAnalyzer;
use crate::meta::{HeadModel, MetaManager};
use crate::reporter::generate_report;
use crate::types::{SeoConfig, SeoMetrics, SeoReport};

/// 메타 갱신, 분석, 보고를 한곳에서 제공
#[derive(Debug, Clone)]
pub struct SeoManager {
    meta: MetaManager,
    analyzer: SeoAnalyzer,
}

impl SeoManager {
    pub fn new(config: SeoConfig, origin: impl Into<String>) -> Self {
        Self {
            meta: MetaManager::new(config),
            analyzer: SeoAnalyzer::new(origin),
        }
    }

    pub fn update_meta(&self, head: &mut HeadModel) {
        self.meta.update_meta(head);
    }

    pub fn analyze_content(&self, html: &str) -> Result<SeoMetrics, CoreError> {
        self.analyzer.analyze(html)
    }

    pub fn generate_report(&self, html: &str) -> Result<SeoReport, CoreError> {
        let metrics = self.analyzer.analyze(html)?;
        let report = generate_report(&metrics);
        info!(
            "SEO 점수: {} (이슈 {}개, 권고 {}개)",
            report.score,
            report.issues.len(),
            report.recommendations.len()
        );
        Ok(report)
    }
}
