//! Listener / Server Supervisor
//!
//! Binds the socket, enforces the global connection cap, dispatches
//! accepted connections into protocol tasks, and drains them on shutdown.
//!
//! Admission ordering: the capacity check happens before the task is
//! spawned; the per-address admission check happens inside the task but
//! before any protocol byte is read. A connection rejected by either sees
//! zero response bytes.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use kernel::error::app_error::{AppResult, ResultExt};
use kernel::error::kind::ErrorKind;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::time::timeout;

use crate::config::GateConfig;
use crate::connection;
use crate::ports::{AdmissionPolicy, MetricsCollector, PowService, QuoteProvider};

/// Pause after a transient accept failure before retrying.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

pub struct Server<P, Q, A, M> {
    config: GateConfig,
    pow: Arc<P>,
    quotes: Arc<Q>,
    admission: Arc<A>,
    metrics: Arc<M>,
}

impl<P, Q, A, M> Server<P, Q, A, M>
where
    P: PowService + 'static,
    Q: QuoteProvider + 'static,
    A: AdmissionPolicy + 'static,
    M: MetricsCollector + Sync + 'static,
{
    pub fn new(
        config: GateConfig,
        pow: Arc<P>,
        quotes: Arc<Q>,
        admission: Arc<A>,
        metrics: Arc<M>,
    ) -> Self {
        Self {
            config,
            pow,
            quotes,
            admission,
            metrics,
        }
    }

    /// Bind the configured port and serve until `shutdown` changes.
    /// A bind failure is the only error fatal to the caller.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> AppResult<()> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.config.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_app_err(ErrorKind::Io, "failed to bind listening socket")?;
        self.serve(listener, shutdown).await
    }

    /// Accept loop over an already-bound listener. Split from [`run`] so
    /// tests can bind port 0 and learn the address.
    pub async fn serve(
        &self,
        listener: TcpListener,
        mut shutdown: watch::Receiver<bool>,
    ) -> AppResult<()> {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(addr = %addr, "listening");
        }

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    tracing::info!("shutdown signal received, refusing new connections");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => self.dispatch(stream, peer),
                    Err(err) if is_transient(&err) => {
                        tracing::warn!(error = %err, "transient accept error, backing off");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "accept failed, stopping accept loop");
                        break;
                    }
                },
            }
        }

        // Close the listening socket before draining.
        drop(listener);
        self.drain().await;
        Ok(())
    }

    fn dispatch(&self, stream: TcpStream, peer: SocketAddr) {
        // Capacity admission: over the cap, close with zero bytes written.
        if self.metrics.active_connections() >= self.config.max_connections as i64 {
            tracing::info!(addr = %peer, "connection capacity reached, closing");
            drop(stream);
            return;
        }

        let pow = Arc::clone(&self.pow);
        let quotes = Arc::clone(&self.quotes);
        let admission = Arc::clone(&self.admission);
        let metrics = Arc::clone(&self.metrics);
        let config = self.config.clone();

        tokio::spawn(async move {
            if !admission.is_allowed(peer.ip()) {
                tracing::info!(addr = %peer, "admission denied");
                return;
            }

            metrics.inc_total_connections();
            metrics.inc_active_connections();
            connection::handle(
                stream,
                peer.ip(),
                pow.as_ref(),
                quotes.as_ref(),
                metrics.as_ref(),
                &config,
            )
            .await;
            metrics.dec_active_connections();
        });
    }

    /// Wait for in-flight connections, bounded by the shutdown timeout.
    /// Tasks still running afterwards are abandoned, not cancelled.
    async fn drain(&self) {
        match timeout(self.config.shutdown_timeout, self.metrics.wait_for_drain()).await {
            Ok(()) => tracing::info!("all connections closed"),
            Err(_) => tracing::warn!(
                active = self.metrics.active_connections(),
                "shutdown timeout exceeded, abandoning remaining connections"
            ),
        }
    }
}

fn is_transient(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::Interrupted
            | std::io::ErrorKind::WouldBlock
    )
}
