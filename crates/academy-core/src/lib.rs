//! # academy-core
//!
//! AIacademy 브라우저 텔레메트리 레이어의 도메인 모델, 포트(trait) 정의, 에러 타입.
//! 모든 크레이트가 공유하는 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`] — 도메인 데이터 구조체 (serde Serialize/Deserialize)
//! - [`ports`] — Hexagonal Architecture 포트 인터페이스
//! - [`error`] — 핵심 에러 타입 (thiserror)
//! - [`config`] — 애플리케이션 설정 구조체
//! - [`config_manager`] — 설정 파일 관리 (로드/저장)
//! - [`handle`] — 장기 구독(관찰 채널, 타이머)의 명시적 시작/중지 핸들

pub mod config;
pub mod config_manager;
pub mod error;
pub mod handle;
pub mod models;
pub mod ports;
