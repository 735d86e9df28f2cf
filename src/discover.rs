//! `discover:*` dispatch (spec.md §4.5). Replies always use `typ=1`,
//! `src="server"`, echo `id`, and carry a JSON body — or the plain string
//! `"error:unknown_discovery"` for an unrecognized suffix.

use crate::metrics::Metrics;
use crate::routing::RoutingTable;
use serde::Serialize;
use std::time::Instant;

/// Compile-time version string surfaced by `discover:info`.
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize)]
struct InfoBody {
    version: &'static str,
    agents_online: usize,
    uptime_sec: u64,
}

#[derive(Serialize)]
struct AgentsBody {
    agents: Vec<String>,
}

#[derive(Serialize)]
struct StatsBody {
    scar_exchanges: std::collections::HashMap<String, u64>,
    total_packets: u64,
}

/// Build the `body` string for a `discover:<suffix>` packet. Snapshots are
/// taken under the routing table's read lock; no I/O happens while holding
/// it (the caller does the actual frame write after this returns).
pub async fn dispatch(
    suffix: &str,
    routing: &RoutingTable,
    metrics: &Metrics,
    started_at: Instant,
) -> String {
    match suffix {
        "info" => {
            let body = InfoBody {
                version: SERVER_VERSION,
                agents_online: routing.len().await,
                uptime_sec: started_at.elapsed().as_secs(),
            };
            serde_json::to_string(&body).expect("InfoBody serializes")
        }
        "agents" => {
            let body = AgentsBody {
                agents: routing.snapshot_identities().await,
            };
            serde_json::to_string(&body).expect("AgentsBody serializes")
        }
        "stats" => {
            let body = StatsBody {
                scar_exchanges: metrics.scar_snapshot().await,
                total_packets: metrics.total_packets(),
            };
            serde_json::to_string(&body).expect("StatsBody serializes")
        }
        _ => "error:unknown_discovery".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn info_reports_version_and_agent_count() {
        let routing = RoutingTable::new();
        let metrics = Metrics::new();
        let started = Instant::now();

        let body = dispatch("info", &routing, &metrics, started).await;
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["version"], SERVER_VERSION);
        assert_eq!(parsed["agents_online"], 0);
        assert!(parsed["uptime_sec"].is_u64());
    }

    #[tokio::test]
    async fn agents_lists_identities() {
        let routing = RoutingTable::new();
        let metrics = Metrics::new();

        let body = dispatch("agents", &routing, &metrics, Instant::now()).await;
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["agents"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn stats_reports_counters() {
        let routing = RoutingTable::new();
        let metrics = Metrics::new();
        metrics.record_packet();
        metrics.bump_scar("bot:a").await;

        let body = dispatch("stats", &routing, &metrics, Instant::now()).await;
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed["total_packets"], 1);
        assert_eq!(parsed["scar_exchanges"]["bot:a"], 1);
    }

    #[tokio::test]
    async fn unknown_suffix_is_plain_error_string() {
        let routing = RoutingTable::new();
        let metrics = Metrics::new();
        let body = dispatch("bogus", &routing, &metrics, Instant::now()).await;
        assert_eq!(body, "error:unknown_discovery");
    }
}
