//! OAuth2 client-credentials 토큰 캐시.
//!
//! 토큰 하나를 메모리에 보관하고, 없거나 만료되면 토큰 엔드포인트에서 다시 발급받는다.
//! 만료 시각은 `발급 시각 + expires_in - 60초`로 잡아 요청 도중 만료를 피한다.
//! 갱신은 비동기 뮤텍스 안에서 수행하므로 동시에 캐시 미스가 나도 교환은 한 번만 일어난다.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use targetlink_core::config::AuthConfig;
use targetlink_core::error::CoreError;
use targetlink_core::ports::clock::{Clock, SystemClock};
use tokio::sync::Mutex;
use tracing::debug;

/// 만료 전 여유 시간 (초)
const EXPIRY_SKEW_SECS: i64 = 60;

/// 서버가 `expires_in`을 생략했을 때의 수명 (초)
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// 토큰 엔드포인트 응답
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

/// 캐시된 토큰
#[derive(Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// client-credentials 자격증명
#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .finish()
    }
}

impl From<&AuthConfig> for ClientCredentials {
    fn from(config: &AuthConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            scope: config.scope.clone(),
        }
    }
}

/// 액세스 토큰 캐시: 발급/만료 관리
#[derive(Clone)]
pub struct TokenCache {
    token_url: String,
    credentials: ClientCredentials,
    client: reqwest::Client,
    clock: Arc<dyn Clock>,
    state: Arc<Mutex<Option<CachedToken>>>,
}

impl TokenCache {
    /// 새 토큰 캐시 생성 (시스템 시계 사용)
    ///
    /// `timeout`은 토큰 교환 요청 하나에 적용된다. 교환 중에는 캐시 잠금이 유지된다.
    pub fn new(
        token_url: &str,
        credentials: ClientCredentials,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 빌드 실패: {e}")))?;

        Ok(Self {
            token_url: token_url.to_string(),
            credentials,
            client,
            clock: Arc::new(SystemClock),
            state: Arc::new(Mutex::new(None)),
        })
    }

    /// 인증 설정에서 생성
    pub fn from_config(config: &AuthConfig, timeout: Duration) -> Result<Self, CoreError> {
        Self::new(&config.token_url, ClientCredentials::from(config), timeout)
    }

    /// 시계 교체 (테스트용 고정 시각 등)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// 유효한 액세스 토큰 반환 (없거나 만료 시 재발급)
    pub async fn get_access_token(&self) -> Result<String, CoreError> {
        let mut state = self.state.lock().await;

        if let Some(token) = state.as_ref() {
            if token.is_valid_at(self.clock.now()) {
                return Ok(token.value.clone());
            }
            debug!("토큰 만료 ({}), 재발급", token.expires_at);
        }

        let token = self.exchange().await?;
        let value = token.value.clone();
        *state = Some(token);
        Ok(value)
    }

    /// 캐시와 무관하게 새 토큰 발급 후 캐시 교체
    pub async fn fetch_access_token(&self) -> Result<String, CoreError> {
        let mut state = self.state.lock().await;
        let token = self.exchange().await?;
        let value = token.value.clone();
        *state = Some(token);
        Ok(value)
    }

    /// 캐시된 토큰 폐기
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        *state = None;
        debug!("토큰 캐시 폐기");
    }

    /// 캐시된 토큰의 만료 시각
    pub async fn expires_at(&self) -> Option<DateTime<Utc>> {
        let state = self.state.lock().await;
        state.as_ref().map(|t| t.expires_at)
    }

    /// 현재 유효한 토큰 보유 여부
    pub async fn is_authenticated(&self) -> bool {
        let state = self.state.lock().await;
        state
            .as_ref()
            .is_some_and(|t| t.is_valid_at(self.clock.now()))
    }

    /// client-credentials 교환 (재시도 없음)
    async fn exchange(&self) -> Result<CachedToken, CoreError> {
        let issued_at = self.clock.now();
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("scope", self.credentials.scope.as_str()),
        ];

        let resp = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| CoreError::Auth(format!("토큰 발급 요청 실패: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(CoreError::Auth(format!("토큰 발급 실패 ({status}): {text}")));
        }

        let token_resp: TokenResponse = resp
            .json()
            .await
            .map_err(|e| CoreError::Auth(format!("토큰 파싱 실패: {e}")))?;

        let lifetime = token_resp.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        let expires_at = expiry_for(issued_at, lifetime).ok_or_else(|| {
            CoreError::Auth(format!("토큰 만료값 범위 초과: expires_in={lifetime}"))
        })?;

        debug!("토큰 발급 성공, 만료: {expires_at}");
        Ok(CachedToken {
            value: token_resp.access_token,
            expires_at,
        })
    }
}

/// `발급 시각 + expires_in - 60초`. 범위를 벗어나면 `None`
fn expiry_for(issued_at: DateTime<Utc>, expires_in: i64) -> Option<DateTime<Utc>> {
    let lifetime = TimeDelta::try_seconds(expires_in)?;
    let skew = TimeDelta::try_seconds(EXPIRY_SKEW_SECS)?;
    issued_at
        .checked_add_signed(lifetime)?
        .checked_sub_signed(skew)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::sync::Mutex as StdMutex;

    const TOKEN_PATH: &str = "/ims/token/v3";

    /// 수동으로 시각을 움직이는 시계
    struct FakeClock {
        now: StdMutex<DateTime<Utc>>,
    }

    impl FakeClock {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                now: StdMutex::new(Utc::now()),
            })
        }

        fn advance(&self, secs: i64) {
            let mut now = self.now.lock().unwrap();
            *now += TimeDelta::seconds(secs);
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    fn credentials() -> ClientCredentials {
        ClientCredentials {
            client_id: "cid".to_string(),
            client_secret: "secret".to_string(),
            scope: "openid,target_sdk".to_string(),
        }
    }

    fn cache_for(server: &mockito::ServerGuard, clock: Arc<FakeClock>) -> TokenCache {
        TokenCache::new(
            &format!("{}{TOKEN_PATH}", server.url()),
            credentials(),
            Duration::from_secs(5),
        )
        .unwrap()
        .with_clock(clock)
    }

    async fn token_mock(server: &mut mockito::ServerGuard, hits: usize) -> mockito::Mock {
        server
            .mock("POST", TOKEN_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"tok_1","token_type":"bearer","expires_in":3600}"#)
            .expect(hits)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn sends_client_credentials_form() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", TOKEN_PATH)
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "client_credentials".into()),
                Matcher::UrlEncoded("client_id".into(), "cid".into()),
                Matcher::UrlEncoded("client_secret".into(), "secret".into()),
                Matcher::UrlEncoded("scope".into(), "openid,target_sdk".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"tok_1","expires_in":3600}"#)
            .create_async()
            .await;

        let cache = cache_for(&server, FakeClock::new());
        assert_eq!(cache.get_access_token().await.unwrap(), "tok_1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn cached_token_is_reused() {
        let mut server = mockito::Server::new_async().await;
        let mock = token_mock(&mut server, 1).await;
        let clock = FakeClock::new();

        let cache = cache_for(&server, clock.clone());
        assert_eq!(cache.get_access_token().await.unwrap(), "tok_1");
        clock.advance(3000);
        assert_eq!(cache.get_access_token().await.unwrap(), "tok_1");
        assert!(cache.is_authenticated().await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn expiry_includes_sixty_second_margin() {
        let mut server = mockito::Server::new_async().await;
        let _mock = token_mock(&mut server, 1).await;
        let clock = FakeClock::new();
        let issued_at = clock.now();

        let cache = cache_for(&server, clock.clone());
        cache.get_access_token().await.unwrap();
        assert_eq!(
            cache.expires_at().await,
            Some(issued_at + TimeDelta::seconds(3540))
        );
    }

    #[tokio::test]
    async fn expired_token_is_never_returned() {
        let mut server = mockito::Server::new_async().await;
        let mock = token_mock(&mut server, 2).await;
        let clock = FakeClock::new();

        let cache = cache_for(&server, clock.clone());
        cache.get_access_token().await.unwrap();

        // expires_at == now → 유효하지 않음 (엄격한 비교)
        clock.advance(3540);
        assert!(!cache.is_authenticated().await);
        cache.get_access_token().await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn concurrent_cold_cache_exchanges_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = token_mock(&mut server, 1).await;
        let cache = cache_for(&server, FakeClock::new());

        let calls = (0..5).map(|_| cache.get_access_token());
        let results = futures::future::join_all(calls).await;
        assert!(results.iter().all(|r| matches!(r, Ok(t) if t == "tok_1")));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn fetch_always_exchanges() {
        let mut server = mockito::Server::new_async().await;
        let mock = token_mock(&mut server, 2).await;
        let cache = cache_for(&server, FakeClock::new());

        cache.fetch_access_token().await.unwrap();
        cache.fetch_access_token().await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn invalidate_forces_new_exchange() {
        let mut server = mockito::Server::new_async().await;
        let mock = token_mock(&mut server, 2).await;
        let cache = cache_for(&server, FakeClock::new());

        cache.get_access_token().await.unwrap();
        cache.invalidate().await;
        assert!(!cache.is_authenticated().await);
        cache.get_access_token().await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_credentials_are_auth_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", TOKEN_PATH)
            .with_status(401)
            .with_body(r#"{"error":"invalid_client"}"#)
            .create_async()
            .await;

        let cache = cache_for(&server, FakeClock::new());
        let err = cache.get_access_token().await.unwrap_err();
        assert!(matches!(err, CoreError::Auth(ref msg) if msg.contains("invalid_client")));
        assert!(!cache.is_authenticated().await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn malformed_body_is_auth_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", TOKEN_PATH)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let cache = cache_for(&server, FakeClock::new());
        let err = cache.get_access_token().await.unwrap_err();
        assert!(matches!(err, CoreError::Auth(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_auth_error() {
        // 도달 불가 URL → 전송 실패
        let cache =
            TokenCache::new("http://127.0.0.1:1/token", credentials(), Duration::from_secs(5))
                .unwrap();
        let err = cache.get_access_token().await.unwrap_err();
        assert!(matches!(err, CoreError::Auth(ref msg) if msg.contains("요청 실패")));
    }

    #[tokio::test]
    async fn out_of_range_expires_in_is_auth_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", TOKEN_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"x","expires_in":9223372036854775807}"#)
            .create_async()
            .await;

        let cache = cache_for(&server, FakeClock::new());
        let err = cache.get_access_token().await.unwrap_err();
        assert!(matches!(err, CoreError::Auth(ref msg) if msg.contains("범위 초과")));
        assert!(cache.expires_at().await.is_none());
    }

    #[test]
    fn expiry_bounds() {
        let now = Utc::now();
        assert_eq!(expiry_for(now, 3600), Some(now + TimeDelta::seconds(3540)));
        assert!(expiry_for(now, i64::MAX).is_none());
        assert!(expiry_for(now, i64::MIN).is_none());
        assert!(expiry_for(DateTime::<Utc>::MAX_UTC, 120).is_none());
    }

    #[tokio::test]
    async fn stalled_endpoint_times_out() {
        // 연결은 받지만 응답하지 않는 서버
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let cache = TokenCache::new(
            &format!("http://{addr}/token"),
            credentials(),
            Duration::from_millis(200),
        )
        .unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), cache.get_access_token())
            .await
            .expect("토큰 교환이 타임아웃 없이 멈춤");
        assert!(matches!(result, Err(CoreError::Auth(_))));
        drop(listener);
    }

    #[test]
    fn credentials_debug_redacts_secret() {
        let debug = format!("{:?}", credentials());
        assert!(!debug.contains("\"secret\""));
        assert!(debug.contains("<redacted>"));
    }
}
