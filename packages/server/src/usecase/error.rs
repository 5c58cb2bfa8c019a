//! Error types for the use case layer.
//!
//! The split mirrors the protocol's error taxonomy: authentication failures
//! are fatal to the connection, authorization and validation failures are
//! recoverable, and external lookup failures during authorization collapse
//! into the generic denial so infrastructure detail never leaks to clients.

use thiserror::Error;

use crate::auth::TokenError;
use crate::domain::MAX_MESSAGE_CHARS;

/// Authentication failure: fatal, the connection is closed after the error
/// event is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthenticateError {
    #[error("authentication failed: {0}")]
    InvalidToken(#[from] TokenError),
    #[error("authentication failed: unknown user")]
    UnknownUser,
    #[error("authentication failed: user directory unavailable")]
    DirectoryUnavailable,
}

/// Authorization failure: recoverable, the session stays authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRoomError {
    #[error("you do not have access to this course chat")]
    AccessDenied,
}

/// Message validation failure: recoverable, nothing is broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("message exceeds {MAX_MESSAGE_CHARS} characters")]
    MessageTooLong,
}
