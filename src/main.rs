//! Agent Relay — signed, length-framed TCP packet forwarding between agents.
//!
//! No consensus, no storage, no peer discovery beyond the in-memory
//! identity table — pure relay.

use agent_relay::RelayCore;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "agent-relay", version, about = "Agent-to-agent message relay")]
struct Args {
    /// Listen port
    #[arg(short, long, default_value = "9009")]
    port: u16,

    /// Emit logs as JSON instead of the default human-readable format
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("agent_relay=info".parse().unwrap());
    if args.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("════════════════════════════════════════════════════════════");
    info!("  Agent Relay v{} — listening on port {}", VERSION, args.port);
    info!("════════════════════════════════════════════════════════════");

    let core = Arc::new(RelayCore::new());

    tokio::select! {
        result = agent_relay::server::run(core, args.port) => {
            if let Err(e) = result {
                error!("relay stopped: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received, exiting");
        }
    }
}
