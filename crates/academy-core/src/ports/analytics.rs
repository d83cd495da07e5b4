//! 분석 이벤트 포트.
//!
//! [`EventSink`]는 모든 계측 컴포넌트가 쓰는 단일 이벤트 깔때기,
//! [`AnalyticsProvider`]는 깔때기 뒤의 개별 전달 대상(콘솔, 외부 서비스 등).

use crate::error::CoreError;
use crate::models::event::{AnalyticsEvent, DispatchedEvent};

/// 이벤트 깔때기: 실패하지 않는다 (전달 실패는 내부에서 로깅)
pub trait EventSink: Send + Sync {
    fn track(&self, event: AnalyticsEvent);
}

/// 이벤트 전달 대상
pub trait AnalyticsProvider: Send + Sync {
    /// 로그/식별용 이름
    fn name(&self) -> &str;

    fn dispatch(&self, event: &DispatchedEvent) -> Result<(), CoreError>;
}
