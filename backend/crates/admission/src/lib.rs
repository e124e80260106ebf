//! Admission Control
//!
//! Per-source-address sliding-window rate limiting with escalating
//! blacklisting. The decision runs immediately after socket acceptance,
//! before any protocol byte is read, so a hostile probe costs one map
//! lookup.
//!
//! A source that fills its window is banned on that same evaluation; there
//! is no separate violation threshold.

pub mod config;
pub mod control;

pub use config::AdmissionConfig;
pub use control::AdmissionControl;
