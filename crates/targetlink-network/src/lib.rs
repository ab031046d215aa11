//! # targetlink-network
//!
//! Target API 네트워크 어댑터.
//! OAuth2 client-credentials 토큰 캐시와 REST 클라이언트(`TargetApi` 포트 구현)를 제공한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use targetlink_network::auth::TokenCache;
//! use targetlink_network::http_client::HttpTargetClient;
//!
//! let tokens = Arc::new(TokenCache::from_config(&config.auth, config.request_timeout())?);
//! let client = HttpTargetClient::from_config(&config, tokens)?;
//! ```

pub mod auth;
pub mod http_client;
