//! 포트 인터페이스 (trait).
//!
//! Hexagonal Architecture의 포트 레이어.
//! 호스트(브라우저) 기능과 외부 협력자를 이 trait들 뒤로 숨기고,
//! `academy-app`의 `TelemetryContext`에서 `Arc<dyn T>`로 와이어링한다.
//!
//! 비동기 포트는 `async_trait` 매크로로 object safety를 보장한다.

pub mod analytics;
pub mod clock;
pub mod environment;
pub mod health;
pub mod performance;
pub mod random;
pub mod storage;
