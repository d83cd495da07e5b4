//! 헬스 체크 포트.
//!
//! 구현: 프로브: `academy-monitor`, 연결 클라이언트: `academy-network` (reqwest)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::health::HealthCheckResult;

/// 독립적으로 실패할 수 있는 비동기 헬스 프로브
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// 프로브 실행: `Err`는 호출자가 critical 결과로 변환한다
    async fn check(&self) -> Result<HealthCheckResult, CoreError>;
}

/// 단일 HEAD 요청 클라이언트
#[async_trait]
pub trait ConnectivityClient: Send + Sync {
    /// HEAD 요청 후 HTTP 상태 코드 반환: 네트워크 실패는 `Err`
    async fn head(&self, url: &str) -> Result<u16, CoreError>;
}
