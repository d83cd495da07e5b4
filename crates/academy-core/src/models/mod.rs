//! 텔레메트리 도메인 모델.
//!
//! 계측 레이어 전체가 공유하는 데이터 구조체를 정의한다.
//! 모든 모델은 `serde` Serialize/Deserialize를 구현한다.

pub mod budget;
pub mod event;
pub mod experiment;
pub mod health;
pub mod page;
pub mod session;
pub mod vitals;
