//! 설정 및 DI 와이어링 통합 테스트.
//!
//! 설정 파일/환경변수 → AppConfig → 어댑터 생성 검증.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use targetlink_core::config::AppConfig;
use targetlink_core::config_loader::load_config_from;
use targetlink_network::auth::TokenCache;
use targetlink_network::http_client::HttpTargetClient;
use targetlink_offers::aggregator::ActivityOfferAggregator;

#[test]
fn config_defaults_are_sane() {
    let config = AppConfig::default_config();

    assert!(config.auth.token_url.starts_with("https://"));
    assert!(config.api.base_url.starts_with("https://"));
    assert!(config.request_timeout().as_millis() > 0);
    assert_eq!(config.filter.name_marker, "travaTelas");
    assert_eq!(config.filter.approved_state, "approved");
    assert!(config.filter.page_size > 0);

    // 자격증명이 비어 있으면 검증 실패
    assert!(config.validate().is_err());
}

#[test]
fn file_and_env_produce_valid_config() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{
            "auth": {{ "client_id": "from_file", "client_secret": "s3cr3t" }},
            "api": {{ "tenant_id": "acme", "api_key": "key_1" }}
        }}"#
    )
    .unwrap();

    let env = HashMap::from([(
        "TARGETLINK_FILTER__NAME_MARKER".to_string(),
        "otherMarker".to_string(),
    )]);
    let config = load_config_from(Some(file.path()), Some(env)).unwrap();

    assert!(config.validate().is_ok());
    assert_eq!(config.auth.client_id, "from_file");
    assert_eq!(config.filter.name_marker, "otherMarker");
    assert_eq!(config.target_base_url(), "https://mc.adobe.io/acme/target");
}

#[tokio::test]
async fn adapters_instantiate_from_config() {
    let mut config = AppConfig::default_config();
    config.auth.client_id = "cid".to_string();
    config.auth.client_secret = "s3cr3t".to_string();
    config.api.tenant_id = "acme".to_string();
    config.api.api_key = "key_1".to_string();

    let tokens =
        Arc::new(TokenCache::from_config(&config.auth, config.request_timeout()).unwrap());
    assert!(!tokens.is_authenticated().await);

    let api = Arc::new(HttpTargetClient::from_config(&config, tokens.clone()).unwrap());
    let _aggregator = ActivityOfferAggregator::new(api, config.filter.clone());
}

#[test]
fn invalid_api_base_url_is_rejected() {
    let mut config = AppConfig::default_config();
    config.api.base_url = "not a url".to_string();
    config.api.tenant_id = "acme".to_string();

    let tokens =
        Arc::new(TokenCache::from_config(&config.auth, config.request_timeout()).unwrap());
    assert!(HttpTargetClient::from_config(&config, tokens).is_err());
}
