//! Domain layer - pure verification logic

pub mod services;
