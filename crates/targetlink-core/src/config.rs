//! 애플리케이션 설정 구조체.
//!
//! 테넌트/클라이언트 자격증명, API 엔드포인트, 오퍼 필터 조건 등
//! 런타임 설정을 정의한다. `config` crate를 통해 파일/환경변수에서 로드.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::CoreError;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 인증 설정
    #[serde(default)]
    pub auth: AuthConfig,
    /// 리소스 API 설정
    #[serde(default)]
    pub api: ApiConfig,
    /// 오퍼 집계 필터 설정
    #[serde(default)]
    pub filter: OfferFilterConfig,
}

/// OAuth2 client-credentials 인증 설정
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// 토큰 발급 엔드포인트
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// 클라이언트 ID (API 키로도 사용 가능)
    #[serde(default)]
    pub client_id: String,
    /// 클라이언트 시크릿
    #[serde(default)]
    pub client_secret: String,
    /// 요청 스코프 (쉼표 구분)
    #[serde(default = "default_scope")]
    pub scope: String,
}

// 시크릿이 로그로 새지 않도록 Debug는 직접 구현
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_url: default_token_url(),
            client_id: String::new(),
            client_secret: String::new(),
            scope: default_scope(),
        }
    }
}

/// 리소스 API 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API 기본 URL (예: "https://mc.adobe.io")
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    /// 테넌트 ID
    #[serde(default)]
    pub tenant_id: String,
    /// `X-Api-Key` 헤더 값
    #[serde(default)]
    pub api_key: String,
    /// 요청 타임아웃 (밀리초)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            tenant_id: String::new(),
            api_key: String::new(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// 오퍼 집계 필터 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferFilterConfig {
    /// 액티비티 이름에 포함되어야 하는 식별 문자열
    #[serde(default = "default_name_marker")]
    pub name_marker: String,
    /// 승인 상태 값 (대소문자 무시 비교)
    #[serde(default = "default_approved_state")]
    pub approved_state: String,
    /// 액티비티 목록 페이지 크기
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for OfferFilterConfig {
    fn default() -> Self {
        Self {
            name_marker: default_name_marker(),
            approved_state: default_approved_state(),
            page_size: default_page_size(),
        }
    }
}

fn default_token_url() -> String {
    "https://ims-na1.adobelogin.com/ims/token/v3".to_string()
}

fn default_scope() -> String {
    "openid,AdobeID,target_sdk,additional_info.roles,read_organizations,additional_info.projectedProductContext"
        .to_string()
}

fn default_api_base_url() -> String {
    "https://mc.adobe.io".to_string()
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_name_marker() -> String {
    "travaTelas".to_string()
}

fn default_approved_state() -> String {
    "approved".to_string()
}

fn default_page_size() -> u32 {
    100
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

impl AppConfig {
    /// 기본 설정값 반환 (자격증명은 비어 있음)
    pub fn default_config() -> Self {
        Self {
            auth: AuthConfig::default(),
            api: ApiConfig::default(),
            filter: OfferFilterConfig::default(),
        }
    }

    /// 요청 타임아웃
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.api.request_timeout_ms)
    }

    /// 테넌트 경로까지 포함한 Target API 루트 (`{base}/{tenant}/target`)
    pub fn target_base_url(&self) -> String {
        format!(
            "{}/{}/target",
            self.api.base_url.trim_end_matches('/'),
            self.api.tenant_id
        )
    }

    /// 원격 호출 전에 필요한 값이 모두 채워졌는지 확인
    pub fn validate(&self) -> Result<(), CoreError> {
        let required = [
            ("api.tenant_id", &self.api.tenant_id),
            ("api.api_key", &self.api.api_key),
            ("auth.client_id", &self.auth.client_id),
            ("auth.client_secret", &self.auth.client_secret),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(CoreError::Config(format!("{field} 미설정")));
            }
        }
        if self.api.request_timeout_ms == 0 {
            return Err(CoreError::Config(
                "api.request_timeout_ms는 0보다 커야 합니다".to_string(),
            ));
        }
        if self.filter.page_size == 0 {
            return Err(CoreError::Config(
                "filter.page_size는 0보다 커야 합니다".to_string(),
            ));
        }
        Ok(())
    }
}
