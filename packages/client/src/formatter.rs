//! Message formatting utilities for terminal display.

use chrono::DateTime;

use crate::event::IncomingMessage;

/// Message formatter for terminal display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format one chat message as a display line
    pub fn format_chat_message(message: &IncomingMessage) -> String {
        let time = Self::format_time(&message.sent_at);
        let tag = match &message.tag {
            Some(tag) => format!(" [{}]", tag),
            None => String::new(),
        };
        format!(
            "[{}] {} ({}){}: {}\n",
            time, message.user_name, message.user_role, tag, message.body
        )
    }

    /// Format the buffered history delivered on join
    pub fn format_history(messages: &[IncomingMessage]) -> String {
        let mut output = String::new();
        output.push_str("--- recent messages ---\n");
        if messages.is_empty() {
            output.push_str("(no messages yet)\n");
        } else {
            for message in messages {
                output.push_str(&Self::format_chat_message(message));
            }
        }
        output.push_str("-----------------------\n");
        output
    }

    /// Format a join/leave presence notification
    pub fn format_presence(message: &str) -> String {
        format!("* {}\n", message)
    }

    /// Format a server error event
    pub fn format_error(message: &str) -> String {
        format!("! {}\n", message)
    }

    /// Render an RFC 3339 timestamp as local wall-clock time, falling back
    /// to the raw string if it does not parse
    fn format_time(rfc3339: &str) -> String {
        match DateTime::parse_from_rfc3339(rfc3339) {
            Ok(dt) => dt.format("%H:%M:%S").to_string(),
            Err(_) => rfc3339.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(tag: Option<&str>) -> IncomingMessage {
        IncomingMessage {
            user_name: "Ada".to_string(),
            user_role: "Instructor".to_string(),
            body: "Welcome!".to_string(),
            tag: tag.map(|t| t.to_string()),
            sent_at: "2023-01-01T12:34:56+00:00".to_string(),
        }
    }

    #[test]
    fn test_format_chat_message_shows_name_role_and_body() {
        // given:
        let message = message(None);

        // when:
        let result = MessageFormatter::format_chat_message(&message);

        // then:
        assert!(result.contains("Welcome!"));
        assert!(result.contains("12:34:56"));
        // no tag between role and body
        assert!(result.contains("(Instructor): "));
    }

    #[test]
    fn test_format_chat_message_includes_tag_when_present() {
        // given:
        let message = message(Some("question"));

        // when:
        let result = MessageFormatter::format_chat_message(&message);

        // then:
        assert!(result.contains("[question]"));
    }

    #[test]
    fn test_format_history_with_no_messages() {
        // given:
        let messages = vec![];

        // when:
        let result = MessageFormatter::format_history(&messages);

        // then:
        assert!(result.contains("recent messages"));
        assert!(result.contains("(no messages yet)"));
    }

    #[test]
    fn test_format_history_lists_messages_in_order() {
        // given:
        let mut first = message(None);
        first.body = "first".to_string();
        let mut second = message(None);
        second.body = "second".to_string();

        // when:
        let result = MessageFormatter::format_history(&[first, second]);

        // then:
        let first_pos = result.find("first").unwrap();
        let second_pos = result.find("second").unwrap();
        assert!(first_pos < second_pos);
    }

    #[test]
    fn test_format_presence_and_error() {
        // given / when / then:
        assert_eq!(
            MessageFormatter::format_presence("Grace joined the chat"),
            "* Grace joined the chat\n"
        );
        assert_eq!(
            MessageFormatter::format_error("message must not be empty"),
            "! message must not be empty\n"
        );
    }

    #[test]
    fn test_format_time_falls_back_to_raw_string() {
        // given:
        let mut message = message(None);
        message.sent_at = "not-a-timestamp".to_string();

        // when:
        let result = MessageFormatter::format_chat_message(&message);

        // then:
        assert!(result.contains("not-a-timestamp"));
    }
}
