//! PoW (Proof of Work) Engine
//!
//! Hashcash-style cost puzzle used to gate the quote service:
//! - `domain/` - pure verification logic (leading-zero-bit difficulty)
//! - `engine` - challenge minting, solution verification, replay prevention
//!
//! ## Security Model
//! - The server is the sole authority for challenge generation, difficulty
//!   and verification; nothing client-supplied is trusted
//! - A (challenge, solution) pair is accepted at most once within its TTL;
//!   reuse is counted separately as a replay attempt
//! - Malformed or oversized solutions are rejected before hashing, bounding
//!   the worst-case verification cost

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;

pub use config::PowConfig;
pub use engine::{PowEngine, PowStats};
pub use error::{PowError, PowResult};

#[cfg(test)]
mod tests;
