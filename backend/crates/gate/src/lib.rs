//! Connection Gate - TCP front for the quote service
//!
//! Structure:
//! - `ports` - capability traits the gate consumes (PoW, quotes, metrics,
//!   admission), substitutable by test doubles
//! - `connection` - per-connection protocol state machine
//! - `server` - listener/supervisor: capacity gating, task dispatch,
//!   graceful drain
//! - `metrics` - atomic counters with an event-driven drain wait
//!
//! One exchange per connection, no keep-alive:
//! `HELLO -> CHALLENGE -> SOLUTION -> QUOTE | ERROR`.

pub mod config;
pub mod connection;
pub mod metrics;
pub mod ports;
pub mod server;

pub use config::GateConfig;
pub use metrics::Metrics;
pub use server::Server;
