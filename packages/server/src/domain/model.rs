//! Value objects and entities for the course chat core.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::DomainError;

/// Maximum number of characters allowed in a chat message body
pub const MAX_MESSAGE_CHARS: usize = 5000;

/// Identifier of a user, as carried in the bearer token's subject claim.
///
/// The chat core does not own user records; this is a foreign reference to
/// the external user store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: String) -> Result<Self, DomainError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Identifier of a course; chat rooms are keyed by this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(String);

impl CourseId {
    pub fn new(value: String) -> Result<Self, DomainError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CourseId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Identifier of one live connection session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Validated chat message body: non-empty after trimming, at most
/// [`MAX_MESSAGE_CHARS`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageBody(String);

impl MessageBody {
    pub fn new(value: String) -> Result<Self, DomainError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyMessageBody);
        }
        let chars = trimmed.chars().count();
        if chars > MAX_MESSAGE_CHARS {
            return Err(DomainError::MessageBodyTooLong(chars));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MessageBody {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Closed set of message tags. Anything outside this set is treated as
/// absent, never as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageTag {
    Task,
    Theory,
    Bug,
    Project,
    Question,
}

impl MessageTag {
    /// Parse a raw tag string; unknown values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "task" => Some(Self::Task),
            "theory" => Some(Self::Theory),
            "bug" => Some(Self::Bug),
            "project" => Some(Self::Project),
            "question" => Some(Self::Question),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Task => "task",
            Self::Theory => "theory",
            Self::Bug => "bug",
            Self::Project => "project",
            Self::Question => "question",
        }
    }
}

/// Role a user holds within one course room, resolved at join time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Instructor,
    Student,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instructor => write!(f, "Instructor"),
            Self::Student => write!(f, "Student"),
        }
    }
}

/// One chat message, resident only in a room's in-memory history buffer.
///
/// `user_name` and `user_role` are snapshots taken when the message was
/// sent; they do not update retroactively.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub user_id: UserId,
    pub user_name: String,
    pub user_role: UserRole,
    pub body: MessageBody,
    pub tag: Option<MessageTag>,
    pub sent_at: i64,
}

impl ChatMessage {
    pub fn new(
        user_id: UserId,
        user_name: String,
        user_role: UserRole,
        body: MessageBody,
        tag: Option<MessageTag>,
        sent_at: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            user_name,
            user_role,
            body,
            tag,
            sent_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_rejects_empty_and_blank() {
        // given / when / then:
        assert_eq!(UserId::new("".to_string()), Err(DomainError::EmptyId));
        assert_eq!(UserId::new("   ".to_string()), Err(DomainError::EmptyId));
    }

    #[test]
    fn test_user_id_trims_whitespace() {
        // given:
        let raw = "  u-42  ".to_string();

        // when:
        let id = UserId::new(raw).unwrap();

        // then:
        assert_eq!(id.as_str(), "u-42");
    }

    #[test]
    fn test_message_body_rejects_empty_after_trimming() {
        // given:
        let raw = " \t\n ".to_string();

        // when:
        let result = MessageBody::new(raw);

        // then:
        assert_eq!(result, Err(DomainError::EmptyMessageBody));
    }

    #[test]
    fn test_message_body_accepts_max_length() {
        // given:
        let raw = "x".repeat(MAX_MESSAGE_CHARS);

        // when:
        let result = MessageBody::new(raw);

        // then:
        assert!(result.is_ok());
    }

    #[test]
    fn test_message_body_rejects_over_max_length() {
        // given:
        let raw = "x".repeat(MAX_MESSAGE_CHARS + 1);

        // when:
        let result = MessageBody::new(raw);

        // then:
        assert_eq!(
            result,
            Err(DomainError::MessageBodyTooLong(MAX_MESSAGE_CHARS + 1))
        );
    }

    #[test]
    fn test_message_tag_parses_known_values() {
        // given / when / then:
        assert_eq!(MessageTag::parse("task"), Some(MessageTag::Task));
        assert_eq!(MessageTag::parse("theory"), Some(MessageTag::Theory));
        assert_eq!(MessageTag::parse("bug"), Some(MessageTag::Bug));
        assert_eq!(MessageTag::parse("project"), Some(MessageTag::Project));
        assert_eq!(MessageTag::parse("question"), Some(MessageTag::Question));
    }

    #[test]
    fn test_message_tag_drops_unknown_values() {
        // given / when / then:
        assert_eq!(MessageTag::parse("nonsense"), None);
        assert_eq!(MessageTag::parse("Question"), None);
        assert_eq!(MessageTag::parse(""), None);
    }

    #[test]
    fn test_chat_message_ids_are_unique() {
        // given:
        let user_id = UserId::new("u-1".to_string()).unwrap();
        let body = MessageBody::new("hello".to_string()).unwrap();

        // when:
        let a = ChatMessage::new(
            user_id.clone(),
            "Ada".to_string(),
            UserRole::Instructor,
            body.clone(),
            None,
            1000,
        );
        let b = ChatMessage::new(
            user_id,
            "Ada".to_string(),
            UserRole::Instructor,
            body,
            None,
            1000,
        );

        // then:
        assert_ne!(a.id, b.id);
    }
}
