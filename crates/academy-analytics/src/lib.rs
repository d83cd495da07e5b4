//! # academy-analytics
//!
//! 분석 이벤트 깔때기와 그 위의 세션/에러 계측.
//!
//! - [`sink`] — [`AnalyticsSink`](sink::AnalyticsSink): 페이지 컨텍스트 부착, 프로바이더 팬아웃, broadcast 구독
//! - [`providers`] — 콘솔(tracing) / 메모리 프로바이더
//! - [`session`] — 세션 추적기와 하트비트/비활성 타이머
//! - [`error_boundary`] — 렌더링 에러 포착과 재시도/새로고침 정책
//! - [`environment`] — 고정 호스트 환경 어댑터

pub mod environment;
pub mod error_boundary;
pub mod providers;
pub mod session;
pub mod sink;
