//! Periodic liveness ticker (spec.md §4.7).
//!
//! Modeled on the teacher's `main.rs` status-printer interval task: a
//! `tokio::time::interval` loop that wakes up, takes a snapshot, and acts on
//! it without holding any lock across the I/O.

use crate::packet::Packet;
use crate::server::RelayCore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Interval between heartbeat sweeps.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(60);

/// Run forever, sending a heartbeat packet to every registered connection
/// every [`HEARTBEAT_INTERVAL`]. A connection whose write fails is evicted
/// from the routing table and closed.
pub async fn run(core: Arc<RelayCore>) {
    let mut ticker = tokio::time::interval(HEARTBEAT_INTERVAL);
    ticker.tick().await; // first tick fires immediately; skip it

    loop {
        ticker.tick().await;
        let conns = core.routing.snapshot_conns().await;
        if conns.is_empty() {
            continue;
        }

        let frame = Packet::heartbeat().encode_packet();
        let mut dead = Vec::new();
        for (identity, handle) in &conns {
            if let Err(e) = handle.write_frame(&frame).await {
                debug!(%identity, error = %e, "heartbeat write failed, evicting");
                dead.push((identity.clone(), handle.clone()));
            }
        }

        for (identity, handle) in dead {
            core.routing.unregister(handle.id).await;
            handle.close().await;
            info!(%identity, "evicted dead connection after failed heartbeat");
        }
    }
}
