//! 호스트 환경 포트.
//!
//! 현재 페이지 위치/제목/referrer와 디바이스 스냅샷을 제공한다.

use crate::models::page::{DeviceInfo, PageContext};

/// 브라우저 창 컨텍스트 제공자
pub trait HostEnvironment: Send + Sync {
    /// 현재 페이지 컨텍스트
    fn page(&self) -> PageContext;

    /// 디바이스 정보
    fn device(&self) -> DeviceInfo;

    /// User-Agent 문자열
    fn user_agent(&self) -> String {
        self.device().user_agent
    }
}
