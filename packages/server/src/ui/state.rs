//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::registry::RoomRegistry;
use crate::usecase::{
    AuthenticateUseCase, DisconnectUseCase, JoinRoomUseCase, SendMessageUseCase,
};

/// Shared application state
pub struct AppState {
    pub authenticate_usecase: Arc<AuthenticateUseCase>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub disconnect_usecase: Arc<DisconnectUseCase>,
    pub registry: Arc<RoomRegistry>,
}
