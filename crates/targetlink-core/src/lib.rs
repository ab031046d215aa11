//! # targetlink-core
//!
//! targetlink 도메인 모델, 포트(trait) 정의, 에러 타입, 오퍼 참조 탐색.
//! 모든 크레이트가 공유하는 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`]: 액티비티/오퍼 데이터 구조체 (serde Serialize/Deserialize)
//! - [`ports`]: Hexagonal Architecture 포트 인터페이스 (async_trait)
//! - [`error`]: 핵심 에러 타입 (thiserror)
//! - [`config`]: 애플리케이션 설정 구조체
//! - [`config_loader`]: 파일/환경변수 설정 로드 (`config` crate)
//! - [`json_graph`]: 탐색 대상 JSON 노드 추상화
//! - [`offer_search`]: 페이로드에서 오퍼 참조 추출

pub mod config;
pub mod config_loader;
pub mod error;
pub mod json_graph;
pub mod models;
pub mod offer_search;
pub mod ports;
