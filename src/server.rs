//! Relay core state and the accept-loop supervisor (spec.md §4.8).
//!
//! Modeled on the teacher's `main()`: bind a listener, spawn the background
//! tickers, then loop accepting connections and spawning a handler task per
//! connection, logging and continuing past accept errors rather than dying.

use crate::error::RelayError;
use crate::metrics::Metrics;
use crate::routing::RoutingTable;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Shared state reachable from every connection handler and background
/// task. Deliberately not a process-wide `static`: it is constructed once in
/// `main` and threaded through via `Arc` (spec.md §9's resolution of the
/// "where does shared mutable state live" open question).
pub struct RelayCore {
    pub routing: RoutingTable,
    pub metrics: Metrics,
    pub started_at: Instant,
}

impl RelayCore {
    pub fn new() -> Self {
        Self {
            routing: RoutingTable::new(),
            metrics: Metrics::new(),
            started_at: Instant::now(),
        }
    }
}

impl Default for RelayCore {
    fn default() -> Self {
        Self::new()
    }
}

/// Bind `port` on all interfaces, spawn the heartbeat ticker, and accept
/// connections until the process is asked to shut down (the caller races
/// this future against a signal future).
pub async fn run(core: Arc<RelayCore>, port: u16) -> Result<(), RelayError> {
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| RelayError::Bind { port, source })?;
    info!(%addr, "relay listening");

    tokio::spawn(crate::heartbeat::run(core.clone()));

    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                info!(%peer_addr, "accepted connection");
                let core = core.clone();
                tokio::spawn(async move {
                    crate::conn::handle_connection(core, stream, peer_addr).await;
                });
            }
            Err(e) => {
                warn!(error = %e, "accept failed, continuing");
                continue;
            }
        }
    }
}
