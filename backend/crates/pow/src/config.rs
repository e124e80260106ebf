//! Engine Configuration

use std::time::Duration;

/// PoW engine configuration
#[derive(Debug, Clone)]
pub struct PowConfig {
    /// Difficulty in leading zero bits
    pub difficulty_bits: u8,
    /// How long an accepted (challenge, solution) pair blocks reuse
    pub solution_ttl: Duration,
    /// Interval between eviction sweeps of the replay store
    pub cleanup_interval: Duration,
}

impl Default for PowConfig {
    fn default() -> Self {
        Self {
            difficulty_bits: 4,
            solution_ttl: Duration::from_secs(300),
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

impl PowConfig {
    pub fn new(difficulty_bits: u8) -> Self {
        Self {
            difficulty_bits,
            ..Self::default()
        }
    }
}
