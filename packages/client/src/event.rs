//! Wire events, as seen from the client side.
//!
//! The client keeps its own copy of the protocol types so it only depends
//! on the wire contract, not on the server crate's internals. Unknown
//! server-side fields are ignored on deserialization.

use serde::{Deserialize, Serialize};

/// Events the client sends
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutgoingEvent {
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
        #[serde(skip_serializing_if = "Option::is_none")]
        tag: Option<String>,
    },
}

/// Events the server sends
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IncomingEvent {
    Authenticated {
        success: bool,
    },
    #[serde(rename_all = "camelCase")]
    RoomJoined {
        course_id: String,
    },
    MessageHistory {
        messages: Vec<IncomingMessage>,
    },
    ReceiveMessage(IncomingMessage),
    #[serde(rename_all = "camelCase")]
    UserJoined {
        user_name: String,
        user_role: String,
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    UserLeft {
        user_name: String,
        user_role: String,
        message: String,
    },
    Error {
        message: String,
    },
}

/// One chat message as received from the server
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingMessage {
    pub user_name: String,
    pub user_role: String,
    pub body: String,
    #[serde(default)]
    pub tag: Option<String>,
    /// RFC 3339 send time
    pub sent_at: String,
}
