//! Capability Traits
//!
//! Interfaces the gate consumes. The production implementations live in
//! their own crates and are wired up here; tests substitute doubles
//! without touching the state machine or the supervisor.

use std::net::IpAddr;

use kernel::error::app_error::AppResult;

/// Proof-of-work challenge minting and solution verification.
pub trait PowService: Send + Sync {
    /// Mint a hex-encoded challenge of `length` random bytes.
    fn generate_challenge(&self, length: usize) -> AppResult<String>;

    /// Verify a solution. `false` covers malformed input, failed
    /// difficulty and replays alike; the engine keeps its own counters.
    fn verify_solution(&self, challenge: &str, solution: &str) -> bool;
}

/// Quote selection. Assumed to always succeed once constructed from a
/// non-empty source.
pub trait QuoteProvider: Send + Sync {
    fn random_quote(&self) -> String;
}

/// Per-source-address admission decision, taken before any protocol byte
/// is read.
pub trait AdmissionPolicy: Send + Sync {
    fn is_allowed(&self, addr: IpAddr) -> bool;
}

/// Connection and challenge counters.
#[trait_variant::make(MetricsCollector: Send)]
pub trait LocalMetricsCollector {
    fn inc_total_connections(&self);
    fn inc_active_connections(&self);
    fn dec_active_connections(&self);
    fn inc_success_challenges(&self);
    fn inc_failed_challenges(&self);
    fn inc_quotes_sent(&self);
    fn active_connections(&self) -> i64;

    /// Resolve once the active-connection count reaches zero.
    async fn wait_for_drain(&self);
}

// ============================================================================
// Production implementations
// ============================================================================

impl PowService for pow::PowEngine {
    fn generate_challenge(&self, length: usize) -> AppResult<String> {
        Ok(pow::PowEngine::generate_challenge(self, length)?)
    }

    fn verify_solution(&self, challenge: &str, solution: &str) -> bool {
        pow::PowEngine::verify_solution(self, challenge, solution)
    }
}

impl QuoteProvider for quotes::QuoteBook {
    fn random_quote(&self) -> String {
        quotes::QuoteBook::random_quote(self)
    }
}

impl AdmissionPolicy for admission::AdmissionControl {
    fn is_allowed(&self, addr: IpAddr) -> bool {
        admission::AdmissionControl::is_allowed(self, addr)
    }
}
