//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, secure randomness, hex encoding)
//! - Rate limiting configuration

pub mod crypto;
pub mod rate_limit;
