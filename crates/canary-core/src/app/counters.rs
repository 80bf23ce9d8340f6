//! FailureCounters - 失敗回数のカウンタ
//!
//! # 学習ポイント
//! - `AtomicU64::fetch_add` による lost update のないインクリメント
//! - グローバル static を使わず、`Arc<FailureCounters>` を明示的に注入
//!
//! 各インクリメントのたびに `metrics` の gauge を更新します。
//! exporter（recorder）を入れるかどうかはバイナリ側の判断です。

use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::Stage;

pub const FAILED_CREATES: &str = "failedCreates";
pub const FAILED_READS: &str = "failedReads";
pub const FAILED_DELETES: &str = "failedDeletes";

/// Point-in-time copy of the three counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub creates: u64,
    pub reads: u64,
    pub deletes: u64,
}

impl CounterSnapshot {
    pub fn total(&self) -> u64 {
        self.creates
            .wrapping_add(self.reads)
            .wrapping_add(self.deletes)
    }
}

/// Process-wide failure counters shared by every worker of every strategy.
///
/// Only increments are exposed; there is no reset.
#[derive(Debug)]
pub struct FailureCounters {
    creates: AtomicU64,
    reads: AtomicU64,
    deletes: AtomicU64,
}

impl FailureCounters {
    /// Start at zero and publish the three gauges as 0 right away.
    pub fn new() -> Self {
        for name in [FAILED_CREATES, FAILED_READS, FAILED_DELETES] {
            metrics::gauge!(name).set(0.0);
        }
        Self {
            creates: AtomicU64::new(0),
            reads: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
        }
    }

    pub fn increment_create_failures(&self) -> u64 {
        Self::bump(&self.creates, FAILED_CREATES)
    }

    pub fn increment_read_failures(&self) -> u64 {
        Self::bump(&self.reads, FAILED_READS)
    }

    pub fn increment_delete_failures(&self) -> u64 {
        Self::bump(&self.deletes, FAILED_DELETES)
    }

    /// Increment the counter matching `stage`.
    pub fn record(&self, stage: Stage) -> u64 {
        match stage {
            Stage::Create => self.increment_create_failures(),
            Stage::Read => self.increment_read_failures(),
            Stage::Delete => self.increment_delete_failures(),
        }
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            creates: self.creates.load(Ordering::Relaxed),
            reads: self.reads.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
        }
    }

    // fetch_add は u64 の上限で wrap する
    fn bump(counter: &AtomicU64, gauge_name: &'static str) -> u64 {
        let value = counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        metrics::gauge!(gauge_name).set(value as f64);
        value
    }
}

impl Default for FailureCounters {
    fn default() -> Self {
        Self::new()
    }
}
