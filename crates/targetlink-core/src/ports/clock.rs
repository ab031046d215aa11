//! 시계 포트.
//!
//! 토큰 만료 판정을 테스트에서 고정 시각으로 대체하기 위한 seam.

use chrono::{DateTime, Utc};

/// 현재 시각 제공자
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 시스템 시계
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
