//! 액티비티 오퍼 집계기.
//!
//! 액티비티 상세 → 수명 확인 → 오퍼 참조 추출 → 오퍼 상세 동시 조회.
//! 재시도는 하지 않으며 에러는 그대로 호출자에게 전파한다.
//! 수명 만료는 에러가 아니라 빈 결과로 처리한다.

use futures::future::try_join_all;
use serde_json::Value;
use std::sync::Arc;
use targetlink_core::config::OfferFilterConfig;
use targetlink_core::error::CoreError;
use targetlink_core::models::activity::{lifetime_expired, Activity, ActivityQuery};
use targetlink_core::models::offer::{AggregatedOffer, OfferReference};
use targetlink_core::offer_search;
use targetlink_core::ports::api_client::TargetApi;
use tracing::{debug, info, warn};

/// 진단 로그에 남길 페이로드 최대 길이 (문자 수)
const DIAGNOSTIC_PAYLOAD_CHARS: usize = 500;

/// 집계 결과에 붙일 액티비티 정보
#[derive(Debug, Clone)]
struct ActivityMeta {
    id: String,
    name: String,
    activity_type: String,
    status: String,
}

impl ActivityMeta {
    /// 상세 페이로드 우선, 없으면 목록 항목 값 사용
    fn resolve(
        activity_id: &str,
        activity_type: &str,
        details: &Value,
        listed: Option<&Activity>,
    ) -> Self {
        let text = |key: &str| details.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            id: activity_id.to_string(),
            name: text("name")
                .or_else(|| listed.map(|a| a.name.clone()))
                .unwrap_or_default(),
            activity_type: activity_type.to_ascii_lowercase(),
            status: text("state")
                .or_else(|| listed.map(|a| a.state.clone()))
                .unwrap_or_default(),
        }
    }

    fn offer(&self, reference: &OfferReference, offer: Value) -> AggregatedOffer {
        AggregatedOffer {
            activity_id: self.id.clone(),
            activity_name: self.name.clone(),
            activity_type: self.activity_type.clone(),
            status: self.status.clone(),
            offer_id: reference.id.clone(),
            offer_type: reference.offer_type.clone(),
            offer,
        }
    }
}

/// 액티비티 오퍼 집계기
pub struct ActivityOfferAggregator {
    api: Arc<dyn TargetApi>,
    filter: OfferFilterConfig,
}

impl ActivityOfferAggregator {
    /// 새 집계기 생성
    pub fn new(api: Arc<dyn TargetApi>, filter: OfferFilterConfig) -> Self {
        Self { api, filter }
    }

    /// 페이로드에서 첫 번째 오퍼 참조
    pub fn find_json_offer_reference(payload: &Value, excluded_id: &str) -> Option<OfferReference> {
        offer_search::find_offer_reference(payload, excluded_id)
    }

    /// 페이로드에서 모든 오퍼 참조 (발견 순서, 중복 제거)
    pub fn find_json_offer_references(payload: &Value, excluded_id: &str) -> Vec<OfferReference> {
        offer_search::find_offer_references(payload, excluded_id)
    }

    /// 액티비티의 첫 번째 오퍼 조회
    ///
    /// 수명 만료 여부는 보지 않는다. 참조가 없으면 `CoreError::NotFound`.
    pub async fn get_json_offer_from_activity(
        &self,
        activity_id: &str,
        activity_type: &str,
    ) -> Result<AggregatedOffer, CoreError> {
        let details = self
            .api
            .get_activity_details(activity_id, activity_type)
            .await?;

        let Some(reference) = Self::find_json_offer_reference(&details, activity_id) else {
            log_missing_offer(activity_id, activity_type, &details);
            return Err(missing_offer(activity_id));
        };

        let offer = self
            .api
            .get_offer_details(&reference.id, &reference.offer_type)
            .await?;
        let meta = ActivityMeta::resolve(activity_id, activity_type, &details, None);
        Ok(meta.offer(&reference, offer))
    }

    /// 액티비티의 모든 오퍼 조회
    ///
    /// 수명이 만료된 액티비티는 오퍼 조회 없이 빈 목록을 반환한다.
    pub async fn get_json_offers_from_activity(
        &self,
        activity_id: &str,
        activity_type: &str,
    ) -> Result<Vec<AggregatedOffer>, CoreError> {
        self.collect_offers(activity_id, activity_type, None).await
    }

    /// 액티비티 목록 전체 조회 (offset/limit 페이지 순회)
    pub async fn list_all_activities(&self) -> Result<Vec<Activity>, CoreError> {
        let page_size = self.filter.page_size.max(1);
        let mut activities = Vec::new();
        let mut offset: u64 = 0;

        loop {
            let page = self
                .api
                .get_activities(&ActivityQuery::page(offset, page_size))
                .await?;
            let received = page.activities.len() as u64;
            activities.extend(page.activities);
            offset += received;

            if received == 0 || offset >= page.total {
                break;
            }
            debug!("액티비티 다음 페이지: offset={offset}, total={}", page.total);
        }

        Ok(activities)
    }

    /// 이름 표식 + 승인 상태 조건을 만족하는 액티비티의 활성 오퍼 전체
    ///
    /// 결과 순서는 액티비티 목록 순서, 그 안에서는 참조 발견 순서를 따른다.
    pub async fn get_trava_telas_offers(&self) -> Result<Vec<AggregatedOffer>, CoreError> {
        let activities = self.list_all_activities().await?;
        let total = activities.len();

        let selected: Vec<Activity> = activities
            .into_iter()
            .filter(|a| a.name_contains(&self.filter.name_marker))
            .filter(|a| a.has_state(&self.filter.approved_state))
            .collect();

        info!(
            "대상 액티비티 {}/{}건 (표식='{}')",
            selected.len(),
            total,
            self.filter.name_marker
        );

        let per_activity = try_join_all(
            selected
                .iter()
                .map(|a| self.collect_offers(&a.id, &a.activity_type, Some(a))),
        )
        .await?;

        let offers: Vec<AggregatedOffer> = per_activity.into_iter().flatten().collect();
        info!("집계 완료: 오퍼 {}건", offers.len());
        Ok(offers)
    }

    /// 액티비티 하나에 대한 파이프라인
    async fn collect_offers(
        &self,
        activity_id: &str,
        activity_type: &str,
        listed: Option<&Activity>,
    ) -> Result<Vec<AggregatedOffer>, CoreError> {
        let details = self
            .api
            .get_activity_details(activity_id, activity_type)
            .await?;

        if lifetime_expired(&details) {
            debug!("수명 만료 액티비티 건너뜀: {activity_id}");
            return Ok(Vec::new());
        }

        let references = Self::find_json_offer_references(&details, activity_id);
        if references.is_empty() {
            log_missing_offer(activity_id, activity_type, &details);
            return Err(missing_offer(activity_id));
        }

        debug!(
            "액티비티 {activity_id}: 오퍼 참조 {}건",
            references.len()
        );

        let offers = try_join_all(
            references
                .iter()
                .map(|r| self.api.get_offer_details(&r.id, &r.offer_type)),
        )
        .await?;

        let meta = ActivityMeta::resolve(activity_id, activity_type, &details, listed);
        Ok(references
            .iter()
            .zip(offers)
            .map(|(reference, offer)| meta.offer(reference, offer))
            .collect())
    }
}

fn missing_offer(activity_id: &str) -> CoreError {
    CoreError::NotFound {
        resource_type: "OfferReference".to_string(),
        id: activity_id.to_string(),
    }
}

/// 진단 로그용 페이로드: 직렬화 결과의 앞 500자
fn diagnostic_payload(details: &Value) -> Result<String, serde_json::Error> {
    let serialized = serde_json::to_string(details)?;
    Ok(serialized.chars().take(DIAGNOSTIC_PAYLOAD_CHARS).collect())
}

/// 오퍼 참조를 못 찾았을 때의 진단 로그. 직렬화 실패가 원래 에러를 가리지 않는다.
fn log_missing_offer(activity_id: &str, activity_type: &str, details: &Value) {
    match diagnostic_payload(details) {
        Ok(payload) => {
            warn!(
                activity_id,
                activity_type,
                payload = %payload,
                "액티비티에서 오퍼 참조를 찾지 못함"
            );
        }
        Err(e) => {
            warn!(
                activity_id,
                activity_type,
                "액티비티에서 오퍼 참조를 찾지 못함 (페이로드 직렬화 실패: {e})"
            );
        }
    }
}
