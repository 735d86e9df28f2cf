//! Ed25519 Key Generation Tool for Agents
//!
//! Generates a signing keypair for an agent that wants to talk to the relay.
//!
//! Usage:
//!   cargo run --bin relay-keygen -- --name "scout-01" --output ./keys/

use agent_relay::Keypair;
use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "relay-keygen", version, about = "Agent Relay Ed25519 Key Generator")]
struct Args {
    /// Agent name (for documentation and output filenames)
    #[arg(short, long)]
    name: String,

    /// Output directory for keys
    #[arg(short, long, default_value = ".")]
    output: PathBuf,
}

fn main() {
    let args = Args::parse();

    println!("════════════════════════════════════════════════════════════");
    println!("  Agent Relay Ed25519 Key Generator");
    println!("════════════════════════════════════════════════════════════");
    println!();
    println!("Generating keypair for: {}", args.name);
    println!();

    let keypair = Keypair::generate();
    let public_bytes = keypair.public_key_bytes();
    let secret_bytes = keypair.secret_key_bytes();

    fs::create_dir_all(&args.output).expect("failed to create output directory");

    let secret_path = args.output.join(format!("{}_secret.key", args.name));
    fs::write(&secret_path, secret_bytes).expect("failed to write secret key");
    println!("Secret key saved to: {}", secret_path.display());
    println!("  Size: {} bytes", secret_bytes.len());
    println!();

    let public_path = args.output.join(format!("{}_public.key", args.name));
    fs::write(&public_path, public_bytes).expect("failed to write public key");
    println!("Public key saved to: {}", public_path.display());
    println!("  Size: {} bytes", public_bytes.len());
    println!();

    println!("════════════════════════════════════════════════════════════");
    println!("  Public Key (hex)");
    println!("════════════════════════════════════════════════════════════");
    println!();
    println!("{}", hex::encode(public_bytes));
    println!();

    println!("════════════════════════════════════════════════════════════");
    println!("  Verification Test");
    println!("════════════════════════════════════════════════════════════");
    println!();

    let mut packet = agent_relay::Packet::server_reply("verify", "test");
    keypair.sign_packet(&mut packet);
    if agent_relay::verify_packet(&packet) {
        println!("  Signature verification: PASSED");
    } else {
        println!("  Signature verification: FAILED");
        std::process::exit(1);
    }
    println!();

    println!("════════════════════════════════════════════════════════════");
    println!("  SECURITY INSTRUCTIONS");
    println!("════════════════════════════════════════════════════════════");
    println!();
    println!("1. Store {}_secret.key somewhere only this agent can read", args.name);
    println!("2. Never commit the secret key to version control");
    println!("3. Load it at startup and sign every outbound packet with it");
    println!();
}
