//! Metrics Collector
//!
//! Independent lock-free counters plus an event-driven signal for the
//! shutdown drain: `wait_for_drain` resolves as soon as the active count
//! reaches zero, without polling.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::Notify;

use crate::ports::MetricsCollector;

#[derive(Debug, Default)]
pub struct Metrics {
    active_connections: AtomicI64,
    total_connections: AtomicU64,
    success_challenges: AtomicU64,
    failed_challenges: AtomicU64,
    quotes_sent: AtomicU64,
    drained: Notify,
}

/// Counter snapshot for logging.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetricsSnapshot {
    pub active_connections: i64,
    pub total_connections: u64,
    pub success_challenges: u64,
    pub failed_challenges: u64,
    pub quotes_sent: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            active_connections: self.active_connections.load(Ordering::Acquire),
            total_connections: self.total_connections.load(Ordering::Relaxed),
            success_challenges: self.success_challenges.load(Ordering::Relaxed),
            failed_challenges: self.failed_challenges.load(Ordering::Relaxed),
            quotes_sent: self.quotes_sent.load(Ordering::Relaxed),
        }
    }
}

impl MetricsCollector for Metrics {
    fn inc_total_connections(&self) {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_active_connections(&self) {
        self.active_connections.fetch_add(1, Ordering::AcqRel);
    }

    fn dec_active_connections(&self) {
        if self.active_connections.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.drained.notify_waiters();
        }
    }

    fn inc_success_challenges(&self) {
        self.success_challenges.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_failed_challenges(&self) {
        self.failed_challenges.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_quotes_sent(&self) {
        self.quotes_sent.fetch_add(1, Ordering::Relaxed);
    }

    fn active_connections(&self) -> i64 {
        self.active_connections.load(Ordering::Acquire)
    }

    async fn wait_for_drain(&self) {
        loop {
            // Register interest before re-checking so a decrement between
            // the check and the await cannot be missed.
            let notified = self.drained.notified();
            if self.active_connections.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }
}
