//! Per-connection handler: read loop, first-packet registration, and
//! destination dispatch (spec.md §4.4).
//!
//! Modeled on the teacher's `net::connection::ConnectionManager::run` read
//! loop shape (decode -> validate -> dispatch -> loop until error/EOF), but
//! built around the flat `Packet`/`RoutingTable` types instead of the
//! teacher's handshake state machine.

use crate::frame::read_frame;
use crate::packet::Packet;
use crate::routing::{ConnHandle, ConnId};
use crate::server::RelayCore;
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// Drive one accepted connection until the peer disconnects or a framing
/// error ends the stream. Never returns an error: all failures are logged
/// and the connection is simply torn down.
pub async fn handle_connection(core: std::sync::Arc<RelayCore>, stream: TcpStream, peer_addr: SocketAddr) {
    let _ = stream.set_nodelay(true);
    let (mut read_half, write_half) = stream.into_split();

    let conn_id = ConnId::next();
    let handle = ConnHandle::new(conn_id, peer_addr, write_half);
    let mut registered_as: Option<String> = None;

    loop {
        let payload = match read_frame(&mut read_half).await {
            Ok(p) => p,
            Err(e) => {
                debug!(%peer_addr, error = %e, "connection closed");
                break;
            }
        };

        let packet = match Packet::decode_packet(&payload) {
            Ok(p) => p,
            Err(e) => {
                warn!(%peer_addr, error = %e, "dropping undecodable packet");
                continue;
            }
        };

        if packet.sig.is_empty() && packet.pk.is_empty() {
            debug!(%peer_addr, "DROPPED unsigned");
            continue;
        }
        if !crate::crypto::verify_packet(&packet) {
            warn!(%peer_addr, src = %packet.src, "DROPPED invalid sig");
            continue;
        }

        if !packet.src.is_empty() && registered_as.as_deref() != Some(packet.src.as_str()) {
            if let Some(evicted) = core.routing.register(&packet.src, handle.clone()).await {
                info!(identity = %packet.src, "last-writer-wins: closing previous connection");
                evicted.close().await;
            }
            registered_as = Some(packet.src.clone());
        }

        core.metrics.record_packet();
        if !packet.scar.is_empty() {
            core.metrics.bump_scar(&packet.src).await;
            debug!(src = %packet.src, bytes = packet.scar.len(), "scar exchange");
        }

        if dispatch(&core, &handle, &packet).await.is_err() {
            debug!(%peer_addr, "reply write failed, closing connection");
            break;
        }
    }

    if let Some(identity) = registered_as {
        core.routing.unregister(conn_id).await;
        debug!(%identity, %peer_addr, "connection unregistered");
    }
}

/// Dispatch one admissible packet. Returns `Err` only when a *reply* write
/// back to the sending connection fails — per spec.md §4.4/§7, that
/// terminates the sender's handler. A failed *forward* to some other
/// connection never propagates here; it only produces an `error:delivery_failed`
/// reply to the sender.
async fn dispatch(
    core: &RelayCore,
    handle: &ConnHandle,
    packet: &Packet,
) -> Result<(), crate::error::FrameError> {
    info!(from = %packet.src, typ = packet.typ, body = %packet.body, dst = %packet.dst, "dispatch");

    if packet.dst.is_empty() || packet.dst == "server" {
        return reply(handle, packet, "done").await;
    }

    if let Some(suffix) = packet.dst.strip_prefix("discover:") {
        let body = crate::discover::dispatch(suffix, &core.routing, &core.metrics, core.started_at).await;
        return reply(handle, packet, body).await;
    }

    match core.routing.lookup(&packet.dst).await {
        Some(target) => {
            let frame = packet.encode_packet();
            match target.write_frame(&frame).await {
                Ok(()) => {
                    debug!(dst = %packet.dst, "forward delivered");
                    Ok(())
                }
                Err(e) => {
                    warn!(dst = %packet.dst, error = %e, "forward delivery_failed");
                    reply(handle, packet, "error:delivery_failed").await
                }
            }
        }
        None => {
            debug!(dst = %packet.dst, "forward target offline");
            reply(handle, packet, "error:offline").await
        }
    }
}

async fn reply(
    handle: &ConnHandle,
    packet: &Packet,
    body: impl Into<String>,
) -> Result<(), crate::error::FrameError> {
    let response = Packet::server_reply(&packet.id, body);
    handle.write_frame(&response.encode_packet()).await.map_err(|e| {
        debug!(error = %e, "failed to write reply, closing connection");
        e
    })
}
