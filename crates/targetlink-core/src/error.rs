//! targetlink 핵심 에러 타입.
//!
//! 모든 어댑터 crate는 이 타입을 그대로 반환한다. 재시도는 어느 레이어에서도 하지 않는다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 네트워크 호출 전 입력값 검증 실패
    #[error("유효성 검증 실패: {field}: {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 토큰 교환 실패
    #[error("인증 에러: {0}")]
    Auth(String),

    /// 리소스 API가 2xx 이외의 상태를 반환
    #[error("API 에러 ({status}): {body}")]
    Api {
        /// HTTP 상태 코드
        status: u16,
        /// 응답 본문 (읽기 실패 시 빈 문자열)
        body: String,
    },

    /// 전송 계층 실패 (연결, 타임아웃, 응답 디코딩)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 리소스를 찾을 수 없음
    #[error("{resource_type} 미발견: {id}")]
    NotFound {
        /// 리소스 종류 (예: "OfferReference")
        resource_type: String,
        /// 리소스 식별자
        id: String,
    },
}

impl CoreError {
    /// 검증 에러 생성 헬퍼
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// 하위 API 호출 실패 여부 (HTTP 상태 에러 + 전송 실패)
    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::Api { .. } | Self::Network(_))
    }
}
