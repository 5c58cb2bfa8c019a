//! WebSocket event DTOs.
//!
//! Every event on the wire is a tagged variant discriminated by `type`;
//! unknown or malformed payloads fail deserialization at the boundary
//! instead of being trusted at use sites. Field names are camelCase.

use serde::{Deserialize, Serialize};

use seminar_shared::time::timestamp_to_rfc3339;

use crate::domain::{ChatMessage, MessageTag, UserRole};

/// Events sent by the client
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    Authenticate {
        token: String,
    },
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        course_id: String,
    },
    #[serde(rename_all = "camelCase")]
    SendMessage {
        course_id: String,
        message: String,
        #[serde(default)]
        tag: Option<String>,
    },
}

/// Events sent by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Authenticated {
        success: bool,
    },
    #[serde(rename_all = "camelCase")]
    RoomJoined {
        course_id: String,
    },
    MessageHistory {
        messages: Vec<ChatMessageDto>,
    },
    ReceiveMessage(ChatMessageDto),
    #[serde(rename_all = "camelCase")]
    UserJoined {
        user_name: String,
        user_role: UserRole,
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    UserLeft {
        user_name: String,
        user_role: UserRole,
        message: String,
    },
    Error {
        message: String,
    },
}

impl ServerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn user_joined(user_name: &str, user_role: UserRole) -> Self {
        Self::UserJoined {
            user_name: user_name.to_string(),
            user_role,
            message: format!("{user_name} joined the chat"),
        }
    }

    pub fn user_left(user_name: &str, user_role: UserRole) -> Self {
        Self::UserLeft {
            user_name: user_name.to_string(),
            user_role,
            message: format!("{user_name} left the chat"),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("server event serializes to JSON")
    }
}

/// Wire representation of one chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageDto {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_role: UserRole,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<MessageTag>,
    /// RFC 3339 send time
    pub sent_at: String,
}

impl From<&ChatMessage> for ChatMessageDto {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: message.id.clone(),
            user_id: message.user_id.as_str().to_string(),
            user_name: message.user_name.clone(),
            user_role: message.user_role,
            body: message.body.as_str().to_string(),
            tag: message.tag,
            sent_at: timestamp_to_rfc3339(message.sent_at),
        }
    }
}
