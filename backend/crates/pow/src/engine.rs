//! PoW Engine
//!
//! Mints random challenges, verifies submitted solutions against the
//! configured leading-zero-bit difficulty, and prevents replay of accepted
//! (challenge, solution) pairs until their TTL expires.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::PowConfig;
use crate::domain::services::{solution_hash, verify_difficulty};
use crate::error::PowResult;

/// Solutions longer than this many hex characters are rejected before
/// hashing, bounding the worst-case verification cost.
const MAX_SOLUTION_HEX_LEN: usize = 64;

/// Counter snapshot for observability.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PowStats {
    pub total_attempts: u64,
    pub valid_solutions: u64,
    pub replay_attempts: u64,
}

/// The PoW engine. Safe under unbounded concurrent callers; the replay
/// store sits behind one coarse mutex with short critical sections, the
/// counters are independent atomics.
pub struct PowEngine {
    config: PowConfig,
    /// Replay store: challenge ‖ solution -> acceptance instant
    used_solutions: Mutex<HashMap<String, Instant>>,
    total_attempts: AtomicU64,
    valid_solutions: AtomicU64,
    failed_attempts: AtomicU64,
    replay_attempts: AtomicU64,
}

impl PowEngine {
    pub fn new(config: PowConfig) -> Self {
        Self {
            config,
            used_solutions: Mutex::new(HashMap::new()),
            total_attempts: AtomicU64::new(0),
            valid_solutions: AtomicU64::new(0),
            failed_attempts: AtomicU64::new(0),
            replay_attempts: AtomicU64::new(0),
        }
    }

    pub fn difficulty_bits(&self) -> u8 {
        self.config.difficulty_bits
    }

    /// Generate a random challenge of `length` bytes, hex-encoded.
    ///
    /// Fails only when the OS randomness source is unavailable, which is
    /// fatal for the requesting connection but not for the process.
    pub fn generate_challenge(&self, length: usize) -> PowResult<String> {
        let bytes = platform::crypto::random_bytes(length)?;
        Ok(platform::crypto::to_hex(&bytes))
    }

    /// Verify a client-supplied solution for a challenge minted by this
    /// engine. Records the pair on acceptance so it cannot be reused within
    /// `solution_ttl`.
    pub fn verify_solution(&self, challenge: &str, solution: &str) -> bool {
        self.verify_solution_at(challenge, solution, Instant::now())
    }

    /// Verification core with an explicit "now" so replay expiry is
    /// deterministic under test.
    fn verify_solution_at(&self, challenge: &str, solution: &str, now: Instant) -> bool {
        self.total_attempts.fetch_add(1, Ordering::Relaxed);

        if challenge.is_empty() || solution.is_empty() {
            return false;
        }

        // Cheap format checks before the map lookup and the hash.
        if solution.len() > MAX_SOLUTION_HEX_LEN
            || platform::crypto::from_hex(solution).is_err()
        {
            self.failed_attempts.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        let key = format!("{challenge}{solution}");
        {
            let used = self.lock_used();
            if let Some(&accepted_at) = used.get(&key) {
                if now.duration_since(accepted_at) < self.config.solution_ttl {
                    self.replay_attempts.fetch_add(1, Ordering::Relaxed);
                    self.failed_attempts.fetch_add(1, Ordering::Relaxed);
                    return false;
                }
                // Expired record: the pair is eligible again.
            }
        }

        let hash = solution_hash(challenge, solution);
        if !verify_difficulty(&hash, self.config.difficulty_bits) {
            self.failed_attempts.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        // The lock was released while hashing, so occupancy must be
        // re-checked under the same guard as the insert: concurrent calls
        // with an identical pair may not both be accepted.
        match self.lock_used().entry(key) {
            Entry::Occupied(mut slot) => {
                if now.duration_since(*slot.get()) < self.config.solution_ttl {
                    self.replay_attempts.fetch_add(1, Ordering::Relaxed);
                    self.failed_attempts.fetch_add(1, Ordering::Relaxed);
                    return false;
                }
                slot.insert(now);
            }
            Entry::Vacant(slot) => {
                slot.insert(now);
            }
        }
        self.valid_solutions.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Drop replay records older than the TTL. Returns how many were
    /// removed.
    pub fn evict_expired(&self, now: Instant) -> usize {
        let mut used = self.lock_used();
        let before = used.len();
        used.retain(|_, accepted_at| now.duration_since(*accepted_at) < self.config.solution_ttl);
        before - used.len()
    }

    /// Start the recurring eviction task. It runs until `shutdown` changes,
    /// and the returned handle completes once it has stopped.
    pub fn spawn_eviction(self: &Arc<Self>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(engine.config.cleanup_interval);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        let removed = engine.evict_expired(Instant::now());
                        if removed > 0 {
                            tracing::debug!(removed, "evicted expired solution records");
                        }
                    }
                    _ = shutdown.changed() => break,
                }
            }
        })
    }

    pub fn stats(&self) -> PowStats {
        PowStats {
            total_attempts: self.total_attempts.load(Ordering::Relaxed),
            valid_solutions: self.valid_solutions.load(Ordering::Relaxed),
            replay_attempts: self.replay_attempts.load(Ordering::Relaxed),
        }
    }

    pub fn failed_attempts(&self) -> u64 {
        self.failed_attempts.load(Ordering::Relaxed)
    }

    #[cfg(test)]
    pub(crate) fn record_count(&self) -> usize {
        self.lock_used().len()
    }

    #[cfg(test)]
    pub(crate) fn verify_at(&self, challenge: &str, solution: &str, now: Instant) -> bool {
        self.verify_solution_at(challenge, solution, now)
    }

    fn lock_used(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        // A poisoned lock only means another verification panicked; the map
        // itself is still consistent (single insert/remove operations).
        self.used_solutions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
