//! Quote Server Entry Point
//!
//! Wires the quote book, PoW engine, admission controller and metrics into
//! the gate, runs until interrupted, then drains and reports final
//! counters. Uses `anyhow` for startup errors; connection-level errors are
//! handled inside the gate and never reach this layer.

mod config;

use std::sync::Arc;

use admission::AdmissionControl;
use anyhow::{Context, Result};
use gate::{Metrics, Server};
use pow::PowEngine;
use quotes::QuoteBook;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "server=info,gate=info,pow=info,admission=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let quote_book = Arc::new(
        QuoteBook::load(&config.quotes_file)
            .with_context(|| format!("loading quotes from {}", config.quotes_file))?,
    );
    tracing::info!(
        count = quote_book.len(),
        path = %config.quotes_file,
        "quote book loaded"
    );

    let pow_engine = Arc::new(PowEngine::new(config.pow.clone()));
    let admission_control = Arc::new(AdmissionControl::new(config.admission.clone()));
    let metrics = Arc::new(Metrics::new());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Background eviction of expired replay records and idle sources.
    let pow_eviction = pow_engine.spawn_eviction(shutdown_rx.clone());
    let admission_eviction = admission_control.spawn_eviction(shutdown_rx.clone());

    tracing::info!(
        port = config.gate.port,
        difficulty_bits = config.pow.difficulty_bits,
        max_connections = config.gate.max_connections,
        "starting quote server"
    );

    let server = Server::new(
        config.gate.clone(),
        Arc::clone(&pow_engine),
        quote_book,
        admission_control,
        Arc::clone(&metrics),
    );
    let server_task = tokio::spawn(async move { server.run(shutdown_rx).await });

    tokio::signal::ctrl_c()
        .await
        .context("listening for shutdown signal")?;
    tracing::info!("interrupt received, shutting down");
    shutdown_tx.send(true).ok();

    server_task.await.context("joining server task")??;
    pow_eviction.await.context("joining pow eviction task")?;
    admission_eviction
        .await
        .context("joining admission eviction task")?;

    let stats = pow_engine.stats();
    let snapshot = metrics.snapshot();
    tracing::info!(
        total_connections = snapshot.total_connections,
        quotes_sent = snapshot.quotes_sent,
        failed_challenges = snapshot.failed_challenges,
        pow_attempts = stats.total_attempts,
        pow_valid = stats.valid_solutions,
        pow_replays = stats.replay_attempts,
        "server stopped"
    );
    Ok(())
}
