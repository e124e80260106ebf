//! Quote Client Entry Point
//!
//! Reference client: connects, solves one challenge, prints the quote.

mod client;
mod solver;

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::client::QuoteClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let difficulty_bits: u8 = env::var("DIFFICULTY")
        .unwrap_or_else(|_| "4".to_string())
        .parse()
        .context("invalid DIFFICULTY")?;
    let timeout_secs: u64 = env::var("TIMEOUT_SECS")
        .unwrap_or_else(|_| "30".to_string())
        .parse()
        .context("invalid TIMEOUT_SECS")?;

    tracing::info!(addr = %addr, difficulty_bits, "requesting a quote");

    let client = QuoteClient::new(addr, difficulty_bits, Duration::from_secs(timeout_secs));
    let quote = client.fetch_quote().await?;
    println!("{quote}");
    Ok(())
}
