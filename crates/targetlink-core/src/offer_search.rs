//! 오퍼 참조 탐색.
//!
//! 액티비티 페이로드 전체를 깊이 우선으로 훑어 `offerId`/`id`를 가진 객체를
//! 오퍼 참조로 수집한다. 액티비티 자신의 ID와 같은 노드는 참조로 기록하지 않지만
//! 그 하위는 계속 탐색한다.
//!
//! 같은 ID가 여러 번 나오면 처음 발견된 위치를 유지하고, 종류는 `json`을 우선한다.
//! 한 번 `json`으로 기록된 ID는 이후 다른 종류로 덮어쓰지 않는다.
//!
//! ID는 API 경로에 쓰이는 문자열 표기로 비교한다. 숫자 `9001`과 문자열 `"9001"`은
//! 같은 참조이며, 소수부 없는 실수 `9001.0`도 `"9001"`로 본다.

use indexmap::map::Entry;
use indexmap::IndexMap;
use std::collections::HashSet;

use crate::json_graph::{JsonNode, NodeKind};
use crate::models::offer::{OfferReference, OfferType};

/// 오퍼 ID 후보 필드 (앞쪽 우선)
pub const OFFER_ID_FIELDS: [&str; 2] = ["offerId", "id"];

/// 오퍼 종류 후보 필드 (앞쪽 우선, 없으면 `json`)
pub const OFFER_TYPE_FIELDS: [&str; 2] = ["offerType", "type"];

/// 페이로드에서 오퍼 참조 목록 추출 (발견 순서, ID 중복 제거)
pub fn find_offer_references<N: JsonNode>(root: N, excluded_id: &str) -> Vec<OfferReference> {
    let mut search = OfferGraphSearch::new(excluded_id);
    search.run(root);
    search.into_references()
}

/// 첫 번째 오퍼 참조만 반환
pub fn find_offer_reference<N: JsonNode>(root: N, excluded_id: &str) -> Option<OfferReference> {
    find_offer_references(root, excluded_id).into_iter().next()
}

/// 탐색 상태: 호출 한 번 동안만 존재
struct OfferGraphSearch {
    excluded_id: String,
    visited: HashSet<usize>,
    found: IndexMap<String, OfferType>,
}

impl OfferGraphSearch {
    fn new(excluded_id: &str) -> Self {
        Self {
            excluded_id: excluded_id.to_lowercase(),
            visited: HashSet::new(),
            found: IndexMap::new(),
        }
    }

    /// 명시적 스택으로 전위 순회 (깊은 페이로드에서도 스택 오버플로 없음)
    fn run<N: JsonNode>(&mut self, root: N) {
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            let kind = node.kind();
            if kind == NodeKind::Scalar {
                continue;
            }
            if let Some(identity) = node.identity() {
                if !self.visited.insert(identity) {
                    continue;
                }
            }
            if kind == NodeKind::Object {
                self.inspect(&node);
            }
            stack.extend(node.children().into_iter().rev());
        }
    }

    fn inspect<N: JsonNode>(&mut self, node: &N) {
        let Some(id) = node.first_truthy(&OFFER_ID_FIELDS) else {
            return;
        };
        if id.to_lowercase() == self.excluded_id {
            return;
        }
        let offer_type = node
            .first_truthy(&OFFER_TYPE_FIELDS)
            .map(|raw| OfferType::from_raw(&raw))
            .unwrap_or_default();

        match self.found.entry(id) {
            Entry::Vacant(slot) => {
                slot.insert(offer_type);
            }
            Entry::Occupied(mut slot) => {
                if offer_type.is_json() && !slot.get().is_json() {
                    slot.insert(offer_type);
                }
            }
        }
    }

    fn into_references(self) -> Vec<OfferReference> {
        self.found
            .into_iter()
            .map(|(id, offer_type)| OfferReference::new(id, offer_type))
            .collect()
    }
}
