//! Sliding-window admission controller with blacklisting.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::AdmissionConfig;

#[derive(Debug, Default)]
struct SourceRecord {
    /// Request instants inside the trailing window, oldest first
    hits: Vec<Instant>,
    banned_until: Option<Instant>,
}

/// Per-source-address admission state. One coarse mutex guards the whole
/// map; critical sections are a short list scan and prune.
pub struct AdmissionControl {
    config: AdmissionConfig,
    sources: Mutex<HashMap<IpAddr, SourceRecord>>,
}

impl AdmissionControl {
    pub fn new(config: AdmissionConfig) -> Self {
        Self {
            config,
            sources: Mutex::new(HashMap::new()),
        }
    }

    /// Decide whether `addr` may open a connection right now. Accepting
    /// consumes one slot in the address's window; rejections consume
    /// nothing.
    pub fn is_allowed(&self, addr: IpAddr) -> bool {
        self.check_at(addr, Instant::now())
    }

    /// Decision core with an explicit "now" so the sliding window is
    /// deterministic under test.
    fn check_at(&self, addr: IpAddr, now: Instant) -> bool {
        let mut sources = self.lock_sources();
        let record = sources.entry(addr).or_default();

        // An active ban rejects unconditionally, regardless of the window.
        if let Some(banned_until) = record.banned_until {
            if now < banned_until {
                return false;
            }
            record.banned_until = None;
        }

        // Trailing window ending now, not fixed buckets.
        let window = self.config.rate.window;
        record.hits.retain(|&hit| now.duration_since(hit) < window);

        if record.hits.len() as u32 >= self.config.rate.max_requests {
            record.banned_until = Some(now + self.config.blacklist_duration);
            tracing::warn!(addr = %addr, "source address banned");
            return false;
        }

        record.hits.push(now);
        true
    }

    /// Drop records that are empty and unbanned. Returns how many were
    /// removed.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let window = self.config.rate.window;
        let mut sources = self.lock_sources();
        let before = sources.len();
        sources.retain(|_, record| {
            record.hits.retain(|&hit| now.duration_since(hit) < window);
            if record.banned_until.is_some_and(|until| now >= until) {
                record.banned_until = None;
            }
            !record.hits.is_empty() || record.banned_until.is_some()
        });
        before - sources.len()
    }

    /// Start the recurring eviction task. It runs until `shutdown` changes,
    /// and the returned handle completes once it has stopped.
    pub fn spawn_eviction(self: &Arc<Self>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let control = Arc::clone(self);
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(control.config.cleanup_interval);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        let removed = control.evict_idle(Instant::now());
                        if removed > 0 {
                            tracing::debug!(removed, "evicted idle source records");
                        }
                    }
                    _ = shutdown.changed() => break,
                }
            }
        })
    }

    fn lock_sources(&self) -> MutexGuard<'_, HashMap<IpAddr, SourceRecord>> {
        self.sources
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    fn source_count(&self) -> usize {
        self.lock_sources().len()
    }
}
