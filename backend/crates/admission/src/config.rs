//! Admission Configuration

use std::time::Duration;

use platform::rate_limit::RateLimitConfig;

/// Admission controller configuration
#[derive(Debug, Clone)]
pub struct AdmissionConfig {
    /// Sliding-window limit applied per source address
    pub rate: RateLimitConfig,
    /// How long a source stays banned after filling its window
    pub blacklist_duration: Duration,
    /// Interval between eviction sweeps of idle source records
    pub cleanup_interval: Duration,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            rate: RateLimitConfig::default(),
            blacklist_duration: Duration::from_secs(24 * 60 * 60),
            cleanup_interval: Duration::from_secs(60),
        }
    }
}
