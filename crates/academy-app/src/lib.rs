//! # academy-app
//!
//! 텔레메트리 레이어의 조립 지점.
//!
//! - [`context`] — 모든 컴포넌트를 명시적으로 생성/연결하는 `TelemetryContext`
//! - [`lifecycle`] — 종료 신호와 OS 시그널 처리
//! - [`settings`] — 설정 파일 위에 `ACADEMY__SECTION__KEY` 환경변수 오버라이드
//! - [`replay`] — 기록된 페이지 로드 트레이스 재생
//! - [`dashboard`] — 모니터링 대시보드 스냅샷

pub mod context;
pub mod dashboard;
pub mod lifecycle;
pub mod replay;
pub mod settings;
