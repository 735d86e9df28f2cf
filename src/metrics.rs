//! Process-wide counters: total packets handled and per-identity scar
//! (memory-commit) exchange counts. Modeled on the teacher's
//! `net::peer::BoundedInvSet` bounded-collection idiom: once the map is
//! full, new keys are rejected but existing keys keep incrementing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// Maximum distinct identities tracked in `scar_count` (spec.md §4.6).
pub const MAX_SCAR_ENTRIES: usize = 1000;

#[derive(Default)]
pub struct Metrics {
    total_packets: AtomicU64,
    scar_count: Mutex<HashMap<String, u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_packet(&self) {
        self.total_packets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_packets(&self) -> u64 {
        self.total_packets.load(Ordering::Relaxed)
    }

    /// Bump `identity`'s scar-exchange count. If the map is already at
    /// `MAX_SCAR_ENTRIES` and `identity` isn't present, the bump is dropped
    /// silently rather than growing the map further.
    pub async fn bump_scar(&self, identity: &str) {
        let mut map = self.scar_count.lock().await;
        if let Some(count) = map.get_mut(identity) {
            *count += 1;
        } else if map.len() < MAX_SCAR_ENTRIES {
            map.insert(identity.to_string(), 1);
        }
    }

    pub async fn scar_snapshot(&self) -> HashMap<String, u64> {
        self.scar_count.lock().await.clone()
    }
}
