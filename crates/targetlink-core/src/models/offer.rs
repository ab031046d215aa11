//! 오퍼 모델.
//!
//! 액티비티 페이로드에서 발견한 오퍼 참조와 최종 집계 결과를 표현.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// 오퍼 종류. 기본값은 `json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum OfferType {
    /// JSON 오퍼
    #[default]
    Json,
    /// 그 외 종류 (content, html 등 원문 그대로)
    Other(String),
}

impl OfferType {
    /// 원문 문자열에서 변환 (`json`은 대소문자 무시)
    pub fn from_raw(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Other(raw.to_string())
        }
    }

    /// API 경로에 쓰이는 문자열
    pub fn as_str(&self) -> &str {
        match self {
            Self::Json => "json",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }
}

impl fmt::Display for OfferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OfferType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OfferType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_raw(&raw))
    }
}

/// 액티비티 페이로드에서 발견한 오퍼 참조
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferReference {
    /// 오퍼 ID (원문 그대로)
    pub id: String,
    /// 오퍼 종류
    pub offer_type: OfferType,
}

impl OfferReference {
    pub fn new(id: impl Into<String>, offer_type: OfferType) -> Self {
        Self {
            id: id.into(),
            offer_type,
        }
    }

    /// JSON 오퍼 참조
    pub fn json(id: impl Into<String>) -> Self {
        Self::new(id, OfferType::Json)
    }
}

/// 집계 결과: 활성 액티비티 하나에서 나온 오퍼 하나
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedOffer {
    /// 액티비티 ID
    pub activity_id: String,
    /// 액티비티 이름
    pub activity_name: String,
    /// 액티비티 종류 (ab/xt)
    pub activity_type: String,
    /// 액티비티 상태
    pub status: String,
    /// 오퍼 ID
    pub offer_id: String,
    /// 오퍼 종류
    pub offer_type: OfferType,
    /// 오퍼 상세 (API 응답 원문)
    pub offer: serde_json::Value,
}
