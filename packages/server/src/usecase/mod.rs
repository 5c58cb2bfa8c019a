//! Application use cases for the chat core.

mod authenticate;
mod disconnect;
mod error;
mod join_room;
mod send_message;

pub use authenticate::{AuthenticateUseCase, AuthenticatedUser};
pub use disconnect::DisconnectUseCase;
pub use error::{AuthenticateError, JoinRoomError, SendMessageError};
pub use join_room::JoinRoomUseCase;
pub use send_message::SendMessageUseCase;
