//! # 時刻の注入
//!
//! レート制限ウィンドウや `created_at` の基準時刻をユースケースに注入する。
//! テストでは [`FixedClock`] で任意の時刻に固定する。

use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

/// 現在時刻の供給元
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// システム時刻
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 手動で進める時計
///
/// 24 時間ウィンドウの境界を跨ぐシナリオでは
/// [`advance`](FixedClock::advance) で時刻を進める。
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.write().unwrap_or_else(|e| e.into_inner());
        *now += duration;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }
}
