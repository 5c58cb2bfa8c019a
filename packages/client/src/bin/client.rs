//! Course chat client binary.
//!
//! Connects to a Seminar chat server, authenticates with a bearer token,
//! joins one course room and relays stdin lines as chat messages.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin seminar-client -- --token <TOKEN> --course rust-101
//! cargo run --bin seminar-client -- -t <TOKEN> -c rust-101 -u ws://127.0.0.1:8080/ws
//! ```

use clap::Parser;

use seminar_client::session::run_client;
use seminar_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "seminar-client")]
#[command(about = "CLI chat client for Seminar course rooms", long_about = None)]
struct Args {
    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Bearer token identifying the user
    #[arg(short = 't', long)]
    token: String,

    /// Course room to join
    #[arg(short = 'c', long)]
    course: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_PKG_NAME"), "info");

    let args = Args::parse();

    // Run the client
    if let Err(e) = run_client(args.url, args.token, args.course).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
