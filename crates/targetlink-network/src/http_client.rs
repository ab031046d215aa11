//! Target REST API 클라이언트.
//!
//! `TargetApi` 포트 구현. Bearer 토큰 + `X-Api-Key` 헤더 자동 주입.
//! 재시도하지 않으며, 2xx 이외 응답은 본문을 담아 `CoreError::Api`로 돌려준다.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use targetlink_core::config::AppConfig;
use targetlink_core::error::CoreError;
use targetlink_core::models::activity::{ActivityList, ActivityQuery, ActivityType};
use targetlink_core::models::offer::OfferType;
use targetlink_core::ports::api_client::TargetApi;
use tracing::debug;
use url::Url;

use crate::auth::TokenCache;

/// Target Admin API v2 미디어 타입
pub const TARGET_MEDIA_TYPE: &str = "application/vnd.adobe.target.v2+json";

/// API 키 헤더
const API_KEY_HEADER: &str = "X-Api-Key";

/// REST API 클라이언트: `TargetApi` 포트 구현
pub struct HttpTargetClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    tokens: Arc<TokenCache>,
}

impl HttpTargetClient {
    /// 새 클라이언트 생성
    ///
    /// `base_url`은 테넌트 경로까지 포함한 루트 (예: `https://mc.adobe.io/acme/target`)
    pub fn new(
        base_url: &str,
        api_key: &str,
        tokens: Arc<TokenCache>,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {e}")))?;

        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| CoreError::Config(format!("잘못된 API URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(CoreError::Config(format!("경로를 붙일 수 없는 URL: {base_url}")));
        }

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
            tokens,
        })
    }

    /// 설정에서 생성
    pub fn from_config(config: &AppConfig, tokens: Arc<TokenCache>) -> Result<Self, CoreError> {
        Self::new(
            &config.target_base_url(),
            &config.api.api_key,
            tokens,
            config.request_timeout(),
        )
    }

    /// 경로 세그먼트를 퍼센트 인코딩해 붙인 URL
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// 인증 헤더가 포함된 GET 요청 빌더
    async fn authorized_get(&self, url: Url) -> Result<reqwest::RequestBuilder, CoreError> {
        let token = self.tokens.get_access_token().await?;
        Ok(self
            .client
            .get(url)
            .bearer_auth(token)
            .header(API_KEY_HEADER, &self.api_key)
            .header(ACCEPT, TARGET_MEDIA_TYPE))
    }

    /// 응답 상태 코드 확인 및 에러 매핑
    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, CoreError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_else(|e| {
            tracing::warn!("응답 본문 읽기 실패: {e}");
            String::new()
        });
        Err(CoreError::Api {
            status: status.as_u16(),
            body,
        })
    }

    /// 요청 전송 → 상태 확인 → JSON 디코딩
    async fn send_json<T: DeserializeOwned>(
        req: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T, CoreError> {
        let resp = req
            .send()
            .await
            .map_err(|e| CoreError::Network(format!("{what} 요청 실패: {e}")))?;
        let resp = Self::check_response(resp).await?;
        resp.json()
            .await
            .map_err(|e| CoreError::Network(format!("{what} 응답 파싱 실패: {e}")))
    }
}

fn require_id(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(field, "ID가 비어 있음"));
    }
    Ok(())
}

#[async_trait]
impl TargetApi for HttpTargetClient {
    async fn get_activities(&self, query: &ActivityQuery) -> Result<ActivityList, CoreError> {
        debug!("액티비티 목록 요청: {query:?}");

        let req = self
            .authorized_get(self.endpoint(&["activities"]))
            .await?
            .query(query);
        let list: ActivityList = Self::send_json(req, "액티비티 목록").await?;

        debug!(
            "액티비티 목록 수신: {}건 (total={})",
            list.activities.len(),
            list.total
        );
        Ok(list)
    }

    async fn get_activity_details(
        &self,
        activity_id: &str,
        activity_type: &str,
    ) -> Result<serde_json::Value, CoreError> {
        require_id("activity_id", activity_id)?;
        let activity_type: ActivityType = activity_type.parse()?;
        debug!("액티비티 상세 요청: {activity_type}/{activity_id}");

        let url = self.endpoint(&["activities", activity_type.as_str(), activity_id.trim()]);
        let req = self.authorized_get(url).await?;
        Self::send_json(req, "액티비티 상세").await
    }

    async fn get_offer_details(
        &self,
        offer_id: &str,
        offer_type: &OfferType,
    ) -> Result<serde_json::Value, CoreError> {
        require_id("offer_id", offer_id)?;
        debug!("오퍼 상세 요청: {offer_type}/{offer_id}");

        let url = self.endpoint(&["offers", offer_type.as_str(), offer_id.trim()]);
        let req = self.authorized_get(url).await?;
        Self::send_json(req, "오퍼 상세").await
    }
}
