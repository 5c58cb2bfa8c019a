//! Domain validation errors.

use thiserror::Error;

use super::model::MAX_MESSAGE_CHARS;

/// Errors raised by value object constructors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("identifier must not be empty")]
    EmptyId,
    #[error("message body must not be empty")]
    EmptyMessageBody,
    #[error("message body exceeds {MAX_MESSAGE_CHARS} characters (got {0})")]
    MessageBodyTooLong(usize),
}
