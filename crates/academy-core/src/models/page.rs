//! 페이지/디바이스 컨텍스트 모델.
//!
//! 호스트 환경(브라우저 창)의 현재 위치와 디바이스 스냅샷.

use serde::{Deserialize, Serialize};
use url::Url;

/// 현재 페이지 컨텍스트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContext {
    /// 전체 URL (href)
    pub url: Url,
    /// 문서 제목
    #[serde(default)]
    pub title: String,
    /// 진입 referrer (없으면 빈 문자열)
    #[serde(default)]
    pub referrer: String,
}

impl PageContext {
    pub fn new(url: Url, title: impl Into<String>, referrer: impl Into<String>) -> Self {
        Self {
            url,
            title: title.into(),
            referrer: referrer.into(),
        }
    }

    pub fn href(&self) -> &str {
        self.url.as_str()
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// `?` 포함 쿼리 문자열 (없으면 빈 문자열)
    pub fn search(&self) -> String {
        self.url.query().map(|q| format!("?{q}")).unwrap_or_default()
    }

    /// `#` 포함 프래그먼트 (없으면 빈 문자열)
    pub fn hash(&self) -> String {
        self.url
            .fragment()
            .map(|f| format!("#{f}"))
            .unwrap_or_default()
    }

    /// scheme + host + port
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }
}

/// 디바이스 정보 스냅샷
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub user_agent: String,
    pub platform: String,
    /// "1920x1080" 형식
    pub screen_resolution: String,
    pub color_depth: u32,
    pub timezone: String,
    pub language: String,
}
