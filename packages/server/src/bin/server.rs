//! Course chat server binary.
//!
//! Serves WebSocket chat rooms for courses, with HMAC bearer-token
//! authentication and enrollment-based access control.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin seminar-server
//! cargo run --bin seminar-server -- --host 0.0.0.0 --port 3000
//! cargo run --bin seminar-server -- --fixtures fixtures.json --token-secret s3cret
//! ```
//!
//! Without `--fixtures` the server starts with a built-in demo dataset and
//! logs ready-to-use tokens for its users.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use seminar_server::{
    auth::{TokenVerifier, issue_token},
    infrastructure::lookup::inmemory::{
        Fixtures, InMemoryCourseCatalog, InMemoryEnrollmentLedger, InMemoryUserDirectory,
    },
    registry::RoomRegistry,
    ui::Server,
    usecase::{AuthenticateUseCase, DisconnectUseCase, JoinRoomUseCase, SendMessageUseCase},
};
use seminar_shared::{
    logger::setup_logger,
    time::{SystemClock, get_unix_timestamp},
};

const DEMO_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Parser, Debug)]
#[command(name = "seminar-server")]
#[command(about = "Course community chat server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Secret shared with the token issuer
    #[arg(long, default_value = "seminar-dev-secret")]
    token_secret: String,

    /// Path to a JSON fixtures file with users, courses and enrollments
    #[arg(long)]
    fixtures: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_PKG_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Lookup stores (users, courses, enrollments)
    // 2. Room registry
    // 3. UseCases
    // 4. Server

    // 1. Load fixtures and build the in-memory lookup stores
    let fixtures = match &args.fixtures {
        Some(path) => {
            let raw = match std::fs::read_to_string(path) {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::error!("Failed to read fixtures file {}: {}", path.display(), e);
                    std::process::exit(1);
                }
            };
            match Fixtures::from_json(&raw) {
                Ok(fixtures) => fixtures,
                Err(e) => {
                    tracing::error!("Failed to parse fixtures file {}: {}", path.display(), e);
                    std::process::exit(1);
                }
            }
        }
        None => {
            let fixtures = Fixtures::demo();
            tracing::info!("No fixtures file given, starting with the demo dataset");
            let exp = (get_unix_timestamp() / 1000).max(0) as u64 + DEMO_TOKEN_TTL_SECS;
            for user in &fixtures.users {
                tracing::info!(
                    "Demo token for {} ({}): {}",
                    user.name,
                    user.id,
                    issue_token(&user.id, &args.token_secret, exp)
                );
            }
            fixtures
        }
    };
    let users = Arc::new(InMemoryUserDirectory::new(&fixtures));
    let courses = Arc::new(InMemoryCourseCatalog::new(&fixtures));
    let enrollments = Arc::new(InMemoryEnrollmentLedger::new(&fixtures));

    // 2. Create the room registry (the only shared mutable chat state)
    let registry = Arc::new(RoomRegistry::new());

    // 3. Create UseCases
    let clock = Arc::new(SystemClock);
    let verifier = TokenVerifier::new(args.token_secret.clone(), clock.clone());
    let authenticate_usecase = Arc::new(AuthenticateUseCase::new(verifier, users));
    let join_room_usecase = Arc::new(JoinRoomUseCase::new(courses, enrollments, registry.clone()));
    let send_message_usecase = Arc::new(SendMessageUseCase::new(registry.clone(), clock));
    let disconnect_usecase = Arc::new(DisconnectUseCase::new(registry.clone()));

    // 4. Create and run the server
    let server = Server::new(
        authenticate_usecase,
        join_room_usecase,
        send_message_usecase,
        disconnect_usecase,
        registry,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
