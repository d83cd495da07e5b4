//! 고정 호스트 환경.
//!
//! 리플레이와 테스트에서 브라우저 창 대신 쓰는 [`HostEnvironment`] 구현.
//! 내비게이션과 제목 변경은 내부 상태를 교체한다.

use academy_core::error::CoreError;
use academy_core::models::page::{DeviceInfo, PageContext};
use academy_core::ports::environment::HostEnvironment;
use parking_lot::RwLock;
use url::Url;

/// 메모리에 고정된 페이지/디바이스 컨텍스트
#[derive(Debug)]
pub struct StaticEnvironment {
    page: RwLock<PageContext>,
    device: DeviceInfo,
}

impl StaticEnvironment {
    pub fn new(page: PageContext, device: DeviceInfo) -> Self {
        Self {
            page: RwLock::new(page),
            device,
        }
    }

    /// URL 문자열로 생성 (제목/referrer 비움, 기본 디바이스)
    pub fn from_url(url: &str) -> Result<Self, CoreError> {
        let url = parse_url(url)?;
        Ok(Self::new(PageContext::new(url, "", ""), DeviceInfo::default()))
    }

    /// 같은 문서 안에서 다른 URL로 이동
    pub fn navigate(&self, url: &str) -> Result<(), CoreError> {
        let url = parse_url(url)?;
        self.page.write().url = url;
        Ok(())
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.page.write().title = title.into();
    }

    pub fn set_referrer(&self, referrer: impl Into<String>) {
        self.page.write().referrer = referrer.into();
    }
}

impl HostEnvironment for StaticEnvironment {
    fn page(&self) -> PageContext {
        self.page.read().clone()
    }

    fn device(&self) -> DeviceInfo {
        self.device.clone()
    }
}

fn parse_url(url: &str) -> Result<Url, CoreError> {
    Url::parse(url).map_err(|e| CoreError::Validation {
        field: "url".to_string(),
        message: format!("{url}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigate_replaces_location() {
        let env = StaticEnvironment::from_url("https://aiacademy.example.com/").unwrap();
        env.navigate("https://aiacademy.example.com/courses?utm_source=mail")
            .unwrap();
        env.set_title("Courses");

        let page = env.page();
        assert_eq!(page.path(), "/courses");
        assert_eq!(page.search(), "?utm_source=mail");
        assert_eq!(page.title, "Courses");
    }

    #[test]
    fn invalid_url_is_validation_error() {
        let err = StaticEnvironment::from_url("not a url").unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[test]
    fn user_agent_comes_from_device() {
        let device = DeviceInfo {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64)".to_string(),
            ..DeviceInfo::default()
        };
        let url = Url::parse("https://aiacademy.example.com/").unwrap();
        let env = StaticEnvironment::new(PageContext::new(url, "", ""), device);
        assert_eq!(env.user_agent(), "Mozilla/5.0 (X11; Linux x86_64)");
    }
}
