//! 핵심 에러 타입.
//!
//! 모든 어댑터 crate는 서드파티 에러를 `map_err`로 [`CoreError`]에 매핑한다.

use thiserror::Error;

/// 코어 레이어 에러.
/// 포트 경계를 넘는 유일한 에러 타입.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패: {field}: {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 영속 저장소 읽기/쓰기 실패
    #[error("저장소 에러: {0}")]
    Storage(String),

    /// 영속 저장소 사용 불가 (프라이빗 모드, 쿼터 초과 등)
    #[error("저장소 사용 불가")]
    StorageUnavailable,

    /// 네트워크 에러 (연결 실패, 타임아웃)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 호스트가 지원하지 않는 브라우저 기능
    #[error("지원되지 않는 기능: {0}")]
    Unsupported(String),

    /// 리소스를 찾을 수 없음
    #[error("{resource_type} 미발견: {id}")]
    NotFound {
        /// 리소스 종류 (예: "AbTest", "Session")
        resource_type: String,
        /// 리소스 식별자
        id: String,
    },

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = CoreError::NotFound {
            resource_type: "AbTest".to_string(),
            id: "hero_cta_test".to_string(),
        };
        assert_eq!(err.to_string(), "AbTest 미발견: hero_cta_test");

        let err = CoreError::Unsupported("longtask".to_string());
        assert!(err.to_string().contains("longtask"));
    }

    #[test]
    fn serde_error_converts() {
        let parse: Result<u32, _> = serde_json::from_str("not-json");
        let err: CoreError = parse.unwrap_err().into();
        assert!(matches!(err, CoreError::Serialization(_)));
    }
}
