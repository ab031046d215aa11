//! Target API 클라이언트 포트.
//!
//! 구현: `targetlink-network` crate (`HttpTargetClient`)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::activity::{ActivityList, ActivityQuery};
use crate::models::offer::OfferType;

/// 액티비티/오퍼 리소스 조회
///
/// 모든 호출은 인증이 필요하며 실패 시 재시도하지 않는다.
#[async_trait]
pub trait TargetApi: Send + Sync {
    /// 액티비티 목록 한 페이지 조회
    async fn get_activities(&self, query: &ActivityQuery) -> Result<ActivityList, CoreError>;

    /// 액티비티 상세 조회 (원문 JSON)
    ///
    /// `activity_type`은 "ab"/"xt"(대소문자 무시)만 허용하며,
    /// 그 외 값이나 빈 ID는 네트워크 호출 전에 `CoreError::Validation`으로 실패한다.
    async fn get_activity_details(
        &self,
        activity_id: &str,
        activity_type: &str,
    ) -> Result<serde_json::Value, CoreError>;

    /// 오퍼 상세 조회 (원문 JSON). 빈 ID는 `CoreError::Validation`.
    async fn get_offer_details(
        &self,
        offer_id: &str,
        offer_type: &OfferType,
    ) -> Result<serde_json::Value, CoreError>;
}
