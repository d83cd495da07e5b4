//! HEAD 요청 연결성 클라이언트.

use academy_core::error::CoreError;
use academy_core::ports::health::ConnectivityClient;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// reqwest 기반 `ConnectivityClient` 구현
#[derive(Debug, Clone)]
pub struct HttpConnectivityClient {
    client: reqwest::Client,
}

impl HttpConnectivityClient {
    /// 요청 전체 타임아웃을 가진 클라이언트 생성
    pub fn new(timeout: Duration) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ConnectivityClient for HttpConnectivityClient {
    /// 상태 코드를 그대로 반환한다. 4xx/5xx도 `Ok`이며, 연결 실패와 타임아웃만 `Err`.
    async fn head(&self, url: &str) -> Result<u16, CoreError> {
        let response = self.client.head(url).send().await.map_err(|e| {
            if e.is_timeout() {
                CoreError::Network(format!("HEAD 요청 타임아웃: {url}"))
            } else {
                CoreError::Network(format!("HEAD 요청 실패: {url}: {e}"))
            }
        })?;

        let status = response.status().as_u16();
        debug!("HEAD {url} → {status}");
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::models::health::HealthStatus;
    use academy_core::ports::clock::SystemClock;
    use academy_core::ports::health::HealthProbe;
    use academy_monitor::health::ConnectivityProbe;
    use std::sync::Arc;

    #[tokio::test]
    async fn head_returns_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("HEAD", "/")
            .with_status(200)
            .create_async()
            .await;

        let client = HttpConnectivityClient::new(Duration::from_secs(5)).unwrap();
        let status = client.head(&format!("{}/", server.url())).await.unwrap();
        assert_eq!(status, 200);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_is_status_not_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("HEAD", "/")
            .with_status(503)
            .create_async()
            .await;

        let client = HttpConnectivityClient::new(Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.head(&format!("{}/", server.url())).await.unwrap(),
            503
        );
    }

    #[tokio::test]
    async fn refused_connection_is_error() {
        let client = HttpConnectivityClient::new(Duration::from_secs(2)).unwrap();
        // 예약된 포트 0은 연결할 수 없다
        let result = client.head("http://127.0.0.1:0/").await;
        assert!(matches!(result, Err(CoreError::Network(_))));
    }

    #[tokio::test]
    async fn probe_over_http() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("HEAD", "/")
            .with_status(404)
            .create_async()
            .await;

        let client = Arc::new(HttpConnectivityClient::new(Duration::from_secs(5)).unwrap());
        let probe = ConnectivityProbe::new(
            client,
            format!("{}/", server.url()),
            Arc::new(SystemClock),
        );
        let result = probe.check().await.unwrap();
        assert_eq!(result.status, HealthStatus::Warning);
        assert_eq!(result.message, "HTTP 404");
    }
}
