//! Client error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected the token. Reconnecting will not help without a
    /// new credential.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("connection error: {0}")]
    ConnectionError(String),
}
