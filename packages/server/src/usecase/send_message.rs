//! UseCase: sending a chat message.
//!
//! Validates and normalizes the payload, stamps id and timestamp, then
//! hands the message to the registry, which appends to the room history and
//! fans out to every member (sender included, so clients render
//! server-confirmed state instead of a local echo) in one critical section.

use std::sync::Arc;

use seminar_shared::time::Clock;

use crate::domain::{ChatMessage, CourseId, DomainError, MessageBody, MessageTag, UserRole};
use crate::infrastructure::dto::websocket::{ChatMessageDto, ServerEvent};
use crate::registry::RoomRegistry;

use super::authenticate::AuthenticatedUser;
use super::error::SendMessageError;

pub struct SendMessageUseCase {
    registry: Arc<RoomRegistry>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    pub fn new(registry: Arc<RoomRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self { registry, clock }
    }

    /// Validate, store and broadcast one message from a joined session.
    ///
    /// Unknown tags are dropped silently; an empty or oversized body is
    /// rejected before anything reaches the room.
    pub async fn execute(
        &self,
        sender: &AuthenticatedUser,
        role: UserRole,
        course_id: &CourseId,
        text: &str,
        raw_tag: Option<&str>,
    ) -> Result<ChatMessage, SendMessageError> {
        let body = MessageBody::new(text.to_string()).map_err(|e| match e {
            DomainError::MessageBodyTooLong(_) => SendMessageError::MessageTooLong,
            _ => SendMessageError::EmptyMessage,
        })?;
        let tag = raw_tag.and_then(MessageTag::parse);

        let message = ChatMessage::new(
            sender.user_id.clone(),
            sender.user_name.clone(),
            role,
            body,
            tag,
            self.clock.now_millis(),
        );

        let json = ServerEvent::ReceiveMessage(ChatMessageDto::from(&message)).to_json();
        self.registry.publish(course_id, message.clone(), &json).await;

        tracing::debug!(
            "Message {} from '{}' published to course '{}'",
            message.id,
            sender.user_id.as_str(),
            course_id.as_str()
        );

        Ok(message)
    }
}
