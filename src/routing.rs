//! Identity <-> connection routing table.
//!
//! A bijection between live identities and live connections, modeled on the
//! teacher's `net::verified_peers::VerifiedPeers` bind/unbind pair (forward
//! map + reverse map kept in lockstep, old entry removed before the new one
//! is installed). Spec.md §4.3 requires one exclusive lock for mutation and
//! shared reads for lookup/snapshot, and forbids holding the lock across
//! connection I/O — so `register`/`unregister` return the evicted handle (if
//! any) instead of closing it themselves, letting the caller close outside
//! the lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::{Mutex, RwLock};

/// Monotonic identifier for a connection, used as the `byConnection` key
/// since the write half itself isn't hashable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnId(u64);

static NEXT_CONN_ID: AtomicU64 = AtomicU64::new(1);

impl ConnId {
    pub fn next() -> Self {
        ConnId(NEXT_CONN_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A handle to a connection's write side, shared between the owning
/// handler (replies), other handlers (forwards) and the heartbeat ticker.
/// The inner mutex is the per-connection write lock spec.md §4.4/§5
/// requires so that a framed packet is always emitted atomically.
#[derive(Clone)]
pub struct ConnHandle {
    pub id: ConnId,
    pub peer_addr: std::net::SocketAddr,
    writer: Arc<Mutex<OwnedWriteHalf>>,
}

impl ConnHandle {
    pub fn new(id: ConnId, peer_addr: std::net::SocketAddr, writer: OwnedWriteHalf) -> Self {
        Self {
            id,
            peer_addr,
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    /// Write one frame to this connection, serialized against every other
    /// concurrent writer of this same connection.
    pub async fn write_frame(&self, payload: &[u8]) -> Result<(), crate::error::FrameError> {
        let mut guard = self.writer.lock().await;
        crate::frame::write_frame(&mut *guard, payload).await
    }

    /// Shut down the write half, causing the owning handler's next read to
    /// observe an error or EOF.
    pub async fn close(&self) {
        use tokio::io::AsyncWriteExt;
        let mut guard = self.writer.lock().await;
        let _ = guard.shutdown().await;
    }
}

/// The bidirectional identity <-> connection map.
#[derive(Default)]
pub struct RoutingTable {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    by_identity: HashMap<String, ConnHandle>,
    by_connection: HashMap<ConnId, String>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `identity` to `conn`. If another connection was already bound to
    /// this identity, both its mappings are removed and the evicted handle
    /// is returned so the caller can close it *outside* this lock (last-
    /// writer-wins, spec.md §3/§4.3). If `conn` was itself already bound to
    /// a *different* identity, that stale mapping is removed too — a
    /// connection never appears under two identities. A no-op if `identity`
    /// is already bound to the same connection.
    pub async fn register(&self, identity: &str, conn: ConnHandle) -> Option<ConnHandle> {
        let mut inner = self.inner.write().await;

        if let Some(existing) = inner.by_identity.get(identity) {
            if existing.id == conn.id {
                return None;
            }
        }

        // conn may already be bound to a different identity on this socket;
        // drop that stale forward entry before installing the new one.
        if let Some(old_identity) = inner.by_connection.get(&conn.id).cloned() {
            if old_identity != identity {
                inner.by_identity.remove(&old_identity);
            }
        }

        let evicted = if let Some(old) = inner.by_identity.remove(identity) {
            inner.by_connection.remove(&old.id);
            Some(old)
        } else {
            None
        };

        inner.by_connection.insert(conn.id, identity.to_string());
        inner.by_identity.insert(identity.to_string(), conn);

        evicted
    }

    /// Remove `conn`'s binding, if any. Idempotent.
    pub async fn unregister(&self, conn_id: ConnId) {
        let mut inner = self.inner.write().await;
        if let Some(identity) = inner.by_connection.remove(&conn_id) {
            inner.by_identity.remove(&identity);
        }
    }

    pub async fn lookup(&self, identity: &str) -> Option<ConnHandle> {
        self.inner.read().await.by_identity.get(identity).cloned()
    }

    pub async fn snapshot_identities(&self) -> Vec<String> {
        self.inner.read().await.by_identity.keys().cloned().collect()
    }

    /// Used by the heartbeat ticker: every `(identity, conn)` pair currently
    /// registered.
    pub async fn snapshot_conns(&self) -> Vec<(String, ConnHandle)> {
        self.inner
            .read()
            .await
            .by_identity
            .iter()
            .map(|(id, c)| (id.clone(), c.clone()))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.by_identity.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
