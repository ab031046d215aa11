//! # targetlink-offers
//!
//! 오퍼 집계 파이프라인.
//! 액티비티 목록에서 이름/상태 조건에 맞는 액티비티를 고르고,
//! 각 액티비티 페이로드에서 오퍼 참조를 찾아 오퍼 상세를 모은다.

pub mod aggregator;
