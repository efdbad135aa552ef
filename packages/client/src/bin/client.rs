//! Dots and Boxes client with reconnection support.
//!
//! As a player it answers every move request with a random legal move; as an
//! observer it prints the board after each state update.
//! Automatically reconnects on disconnection (max 5 attempts with 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin dotbox-client -- --name Alice
//! cargo run --bin dotbox-client -- --role observer
//! ```

use std::time::Duration;

use clap::{Parser, ValueEnum};

use dotbox_client::{ClientOptions, run_client};
use dotbox_shared::{dto::ConnectionRole, logger::setup_logger};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RoleArg {
    Player,
    Observer,
}

impl From<RoleArg> for ConnectionRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Player => ConnectionRole::Player,
            RoleArg::Observer => ConnectionRole::Observer,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "dotbox-client")]
#[command(about = "Dots and Boxes bot player and observer", long_about = None)]
struct Args {
    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Join as a player or as an observer
    #[arg(short = 'r', long, value_enum, default_value_t = RoleArg::Player)]
    role: RoleArg,

    /// Display name shown to observers (players only)
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// Milliseconds to wait before answering a move request
    #[arg(long, default_value_t = 0)]
    think_ms: u64,

    /// Seed for reproducible move choices
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let options = ClientOptions {
        url: args.url,
        role: args.role.into(),
        name: args.name,
        think_time: Duration::from_millis(args.think_ms),
        seed: args.seed,
    };

    if let Err(e) = run_client(options).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
