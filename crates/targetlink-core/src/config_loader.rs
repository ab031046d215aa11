//! 설정 로드.
//!
//! 우선순위: 내장 기본값 → 설정 파일(선택) → `TARGETLINK_` 환경변수.
//! 환경변수의 중첩 구분자는 `__` (예: `TARGETLINK_AUTH__CLIENT_ID`).

use config::{Config, Environment, File};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::CoreError;

/// 환경변수 접두사
pub const ENV_PREFIX: &str = "TARGETLINK";

/// 중첩 키 구분자
const ENV_SEPARATOR: &str = "__";

/// 프로세스 환경변수와 선택적 설정 파일에서 설정 로드
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, CoreError> {
    load_config_from(path, None)
}

/// 환경변수 원본을 직접 지정해 설정 로드
///
/// `env`가 `None`이면 프로세스 환경변수를 읽는다.
pub fn load_config_from(
    path: Option<&Path>,
    env: Option<HashMap<String, String>>,
) -> Result<AppConfig, CoreError> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        if !path.exists() {
            return Err(CoreError::Config(format!(
                "설정 파일 없음: {}",
                path.display()
            )));
        }
        info!("설정 파일: {}", path.display());
        builder = builder.add_source(File::from(path).required(true));
    }

    let environment = Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator(ENV_SEPARATOR)
        .source(env);
    builder = builder.add_source(environment);

    let config = builder
        .build()
        .and_then(Config::try_deserialize::<AppConfig>)
        .map_err(|e| CoreError::Config(format!("설정 로드 실패: {e}")))?;

    debug!(
        tenant = %config.api.tenant_id,
        token_url = %config.auth.token_url,
        "설정 로드 완료"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn empty_sources_yield_defaults() {
        let config = load_config_from(None, env(&[])).unwrap();
        assert_eq!(config.api.base_url, "https://mc.adobe.io");
        assert_eq!(config.filter.name_marker, "travaTelas");
        assert!(config.auth.client_id.is_empty());
    }

    #[test]
    fn env_overrides_nested_keys() {
        let config = load_config_from(
            None,
            env(&[
                ("TARGETLINK_AUTH__CLIENT_ID", "cid"),
                ("TARGETLINK_AUTH__CLIENT_SECRET", "secret"),
                ("TARGETLINK_API__TENANT_ID", "acme"),
                ("TARGETLINK_API__API_KEY", "key"),
                ("UNRELATED_VAR", "ignored"),
            ]),
        )
        .unwrap();

        assert_eq!(config.auth.client_id, "cid");
        assert_eq!(config.api.tenant_id, "acme");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn file_then_env_precedence() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"api":{{"tenant_id":"from-file","api_key":"file-key"}},"filter":{{"name_marker":"promo"}}}}"#
        )
        .unwrap();

        let config = load_config_from(
            Some(file.path()),
            env(&[("TARGETLINK_API__TENANT_ID", "from-env")]),
        )
        .unwrap();

        assert_eq!(config.api.tenant_id, "from-env");
        assert_eq!(config.api.api_key, "file-key");
        assert_eq!(config.filter.name_marker, "promo");
        assert_eq!(config.filter.approved_state, "approved");
    }

    #[test]
    fn missing_file_is_config_error() {
        let result = load_config_from(Some(Path::new("/nonexistent/targetlink.json")), env(&[]));
        assert!(matches!(result, Err(CoreError::Config(_))));
    }
}
