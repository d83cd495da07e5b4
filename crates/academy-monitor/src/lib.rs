//! # academy-monitor
//!
//! 페이지 성능 모니터링.
//! 브라우저 성능 관찰 채널을 `PerformanceSource` 포트로 받아
//! Web Vitals 지표를 계산/등급화하고, 성능 예산과 비교하며,
//! 대형 리소스와 롱태스크를 감시하고, 헬스 프로브를 실행한다.

pub mod budget;
pub mod classifier;
pub mod health;
pub mod metrics;
pub mod reporter;
pub mod resource;
pub mod source;
pub mod vitals;
