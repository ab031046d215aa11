//! 액티비티 모델.
//!
//! Target API의 액티비티 목록/상세 응답을 표현. 이 시스템은 읽기만 한다.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::json_graph::is_truthy;

/// 액티비티 종류: 상세 조회 경로를 결정한다
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityType {
    /// A/B 테스트
    Ab,
    /// Experience Targeting
    Xt,
}

impl ActivityType {
    /// API 경로 세그먼트
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ab => "ab",
            Self::Xt => "xt",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ab" => Ok(Self::Ab),
            "xt" => Ok(Self::Xt),
            "" => Err(CoreError::validation(
                "activity_type",
                "액티비티 종류가 비어 있음",
            )),
            other => Err(CoreError::validation(
                "activity_type",
                format!("지원하지 않는 액티비티 종류 '{other}' (ab 또는 xt)"),
            )),
        }
    }
}

/// 액티비티 목록 항목
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// 액티비티 ID (API는 숫자로 내려주지만 문자열로 보관)
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// 액티비티 이름
    #[serde(default)]
    pub name: String,
    /// 액티비티 종류 원문 ("ab", "xt")
    #[serde(rename = "type", default)]
    pub activity_type: String,
    /// 상태 ("approved", "deactivated", ...)
    #[serde(default)]
    pub state: String,
    /// 수명 정보
    #[serde(default)]
    pub lifetime: Option<Lifetime>,
}

impl Activity {
    /// 이름에 식별 문자열 포함 여부
    pub fn name_contains(&self, marker: &str) -> bool {
        self.name.contains(marker)
    }

    /// 상태 비교 (대소문자 무시)
    pub fn has_state(&self, state: &str) -> bool {
        self.state.eq_ignore_ascii_case(state)
    }
}

/// 액티비티 수명 (`end` 또는 `endDate`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lifetime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Value>,
    #[serde(rename = "endDate", default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Value>,
}

impl Lifetime {
    /// `end`/`endDate` 중 하나라도 truthy면 만료로 본다
    pub fn is_expired(&self) -> bool {
        [&self.end, &self.end_date]
            .into_iter()
            .any(|v| v.as_ref().is_some_and(is_truthy))
    }
}

/// 액티비티 상세 페이로드(원문)의 수명 만료 여부
pub fn lifetime_expired(details: &Value) -> bool {
    details
        .get("lifetime")
        .and_then(|raw| Lifetime::deserialize(raw).ok())
        .is_some_and(|lifetime| lifetime.is_expired())
}

/// 액티비티 목록 한 페이지
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityList {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub activities: Vec<Activity>,
}

/// 액티비티 목록 조회 파라미터 (URL 쿼리로 직렬화)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivityQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(rename = "sortBy", skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
}

impl ActivityQuery {
    /// 페이지 조회 파라미터
    pub fn page(offset: u64, limit: u32) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
            sort_by: None,
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "액티비티 ID는 문자열 또는 숫자여야 함: {other}"
        ))),
    }
}
