//! 세션 추적.
//!
//! - [`tracker`] — 세션 레코드 상태 머신 (active/inactive), 상한 이벤트 로그, 언로드 저장
//! - [`timers`] — 하트비트와 비활성 감지 주기 태스크

pub mod timers;
pub mod tracker;

pub use tracker::{SessionTracker, UTM_KEYS};
