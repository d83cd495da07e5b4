//! # academy-storage
//!
//! 로컬 저장소 어댑터.
//! `KeyValueStore` 포트 구현(메모리, 차단, SQLite), 스키마 마이그레이션,
//! TTL + LRU 제한 캐시와 그 위의 메모이제이션 헬퍼, 기능 플래그를 제공한다.
//!
//! ## 모듈
//! - `memory`: 인메모리/차단 키-값 저장소
//! - `sqlite`: SQLite 키-값 저장소
//! - `migration`: 스키마 마이그레이션
//! - `cache`: `BoundedCache<T>`
//! - `memo`: 캐시 레지스트리, API 응답 캐싱, memoize, preload
//! - `flags`: `maintenance-mode` / `show-monitoring` 플래그

pub mod cache;
pub mod flags;
pub mod memo;
pub mod memory;
pub mod migration;
pub mod sqlite;
