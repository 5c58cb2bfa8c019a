//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::registry::RoomRegistry;
use crate::usecase::{
    AuthenticateUseCase, DisconnectUseCase, JoinRoomUseCase, SendMessageUseCase,
};

use super::{
    handler::{get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket chat server for course rooms
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     authenticate_usecase,
///     join_room_usecase,
///     send_message_usecase,
///     disconnect_usecase,
///     registry,
/// );
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    authenticate_usecase: Arc<AuthenticateUseCase>,
    join_room_usecase: Arc<JoinRoomUseCase>,
    send_message_usecase: Arc<SendMessageUseCase>,
    disconnect_usecase: Arc<DisconnectUseCase>,
    registry: Arc<RoomRegistry>,
}

impl Server {
    pub fn new(
        authenticate_usecase: Arc<AuthenticateUseCase>,
        join_room_usecase: Arc<JoinRoomUseCase>,
        send_message_usecase: Arc<SendMessageUseCase>,
        disconnect_usecase: Arc<DisconnectUseCase>,
        registry: Arc<RoomRegistry>,
    ) -> Self {
        Self {
            authenticate_usecase,
            join_room_usecase,
            send_message_usecase,
            disconnect_usecase,
            registry,
        }
    }

    /// Build the axum router. Exposed separately from [`Server::run`] so
    /// tests can serve the same routes on an ephemeral port.
    pub fn router(self) -> Router {
        let app_state = Arc::new(AppState {
            authenticate_usecase: self.authenticate_usecase,
            join_room_usecase: self.join_room_usecase,
            send_message_usecase: self.send_message_usecase,
            disconnect_usecase: self.disconnect_usecase,
            registry: self.registry,
        });

        Router::new()
            .route("/ws", get(websocket_handler))
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the chat server until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address
    /// or if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("Course chat server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
