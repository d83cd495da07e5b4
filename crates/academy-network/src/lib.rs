//! # academy-network
//!
//! 네트워크 어댑터.
//! `ConnectivityClient` 포트의 reqwest 구현 (타임아웃이 있는 단일 HEAD 요청).

pub mod http_probe;
