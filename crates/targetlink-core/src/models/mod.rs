//! 도메인 모델.

pub mod activity;
pub mod offer;
