//! Server Configuration
//!
//! Every setting is read from the environment with a sensible default, so
//! the binary runs out of the box and each knob can be overridden
//! individually. `.env` files are honored via dotenvy before this module
//! runs.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use admission::AdmissionConfig;
use anyhow::{Context, Result, bail};
use gate::GateConfig;
use platform::rate_limit::RateLimitConfig;
use pow::PowConfig;

const DEFAULT_QUOTES_FILE: &str = "quotes.json";

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gate: GateConfig,
    pub pow: PowConfig,
    pub admission: AdmissionConfig,
    pub quotes_file: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let gate = GateConfig {
            port: env_or("PORT", 8080)?,
            read_timeout: secs_or("READ_TIMEOUT_SECS", 30)?,
            write_timeout: secs_or("WRITE_TIMEOUT_SECS", 30)?,
            shutdown_timeout: secs_or("SHUTDOWN_TIMEOUT_SECS", 30)?,
            max_connections: env_or("MAX_CONNECTIONS", 100)?,
            challenge_length: env_or("CHALLENGE_LENGTH", 32)?,
            max_message_size: env_or("MAX_MESSAGE_SIZE", 1024)?,
            buffer_size: env_or("BUFFER_SIZE", 1024)?,
        };

        let pow = PowConfig {
            difficulty_bits: env_or("POW_DIFFICULTY", 4)?,
            solution_ttl: secs_or("SOLUTION_TTL_SECS", 300)?,
            cleanup_interval: secs_or("CLEANUP_INTERVAL_SECS", 60)?,
        };

        let admission = AdmissionConfig {
            rate: RateLimitConfig {
                max_requests: env_or("MAX_REQUESTS_PER_ADDR", 100)?,
                window: secs_or("RATE_LIMIT_WINDOW_SECS", 60)?,
            },
            blacklist_duration: secs_or("BLACKLIST_DURATION_SECS", 24 * 60 * 60)?,
            cleanup_interval: secs_or("CLEANUP_INTERVAL_SECS", 60)?,
        };

        let quotes_file =
            env::var("QUOTES_FILE").unwrap_or_else(|_| DEFAULT_QUOTES_FILE.to_string());

        let config = Self {
            gate,
            pow,
            admission,
            quotes_file,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.pow.difficulty_bits == 0 {
            bail!("POW_DIFFICULTY must be at least 1");
        }
        if self.gate.challenge_length == 0 {
            bail!("CHALLENGE_LENGTH must be at least 1");
        }
        if self.gate.max_message_size == 0 {
            bail!("MAX_MESSAGE_SIZE must be at least 1");
        }
        if self.gate.buffer_size == 0 {
            bail!("BUFFER_SIZE must be at least 1");
        }
        Ok(())
    }
}

/// Read `key` and parse it, falling back to `default` when unset. A set
/// but unparsable value is a hard error rather than a silent fallback.
fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {key}={raw}: {e}")),
        Err(_) => Ok(default),
    }
}

fn secs_or(key: &str, default_secs: u64) -> Result<Duration> {
    let secs: u64 = env_or(key, default_secs).with_context(|| format!("reading {key}"))?;
    Ok(Duration::from_secs(secs))
}
