//! WebSocket client session management.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::{
    error::ClientError,
    event::{IncomingEvent, OutgoingEvent},
    formatter::MessageFormatter,
};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Run the WebSocket client with reconnection logic.
///
/// Authentication failures are not retried; the token will not get better
/// on its own.
pub async fn run_client(
    url: String,
    token: String,
    course_id: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} (attempt {}/{})",
            url,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        match run_client_session(&url, &token, &course_id).await {
            Ok(_) => {
                tracing::info!("Client session ended normally");
                break;
            }
            Err(ClientError::AuthenticationFailed(reason)) => {
                tracing::error!("Authentication failed: {}. Exiting.", reason);
                std::process::exit(1);
            }
            Err(e) => {
                tracing::warn!("Connection lost: {}", e);
                reconnect_count += 1;

                if reconnect_count >= MAX_RECONNECT_ATTEMPTS {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        MAX_RECONNECT_ATTEMPTS
                    );
                    std::process::exit(1);
                }

                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS,
                    reconnect_count + 1,
                    MAX_RECONNECT_ATTEMPTS
                );

                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }

    Ok(())
}

/// Parse one input line into (tag, message).
///
/// A leading `@word ` marks the message with that tag, e.g.
/// `@question how does ownership work?`.
pub fn parse_input_line(line: &str) -> (Option<String>, String) {
    if let Some(rest) = line.strip_prefix('@') {
        if let Some((tag, message)) = rest.split_once(' ') {
            if !tag.is_empty() {
                return (Some(tag.to_string()), message.trim().to_string());
            }
        }
    }
    (None, line.to_string())
}

/// Run one WebSocket client session: authenticate, join the course room,
/// then relay between stdin and the socket until either side ends.
pub async fn run_client_session(
    url: &str,
    token: &str,
    course_id: &str,
) -> Result<(), ClientError> {
    let (ws_stream, _response) = connect_async(url)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    tracing::info!("Connected to chat server");

    let (mut write, mut read) = ws_stream.split();

    // All outbound events funnel through one channel so the handshake (sent
    // by the read task) and user messages (sent by the stdin task) share
    // the socket's write half.
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<OutgoingEvent>();

    out_tx
        .send(OutgoingEvent::Authenticate {
            token: token.to_string(),
        })
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    let mut writer_task = tokio::spawn(async move {
        while let Some(event) = out_rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize event: {}", e);
                    continue;
                }
            };
            if let Err(e) = write.send(Message::Text(json.into())).await {
                tracing::warn!("Failed to send event: {}", e);
                return false;
            }
        }
        true
    });

    // Read server events, drive the authenticate/join handshake and print
    // everything else.
    let out_tx_for_read = out_tx.clone();
    let course_id_for_read = course_id.to_string();
    let mut read_task = tokio::spawn(async move {
        // error events arriving before this flips mean a rejected credential
        let mut authenticated = false;

        while let Some(message) = read.next().await {
            let message = match message {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    return Err(ClientError::ConnectionError(e.to_string()));
                }
            };

            match message {
                Message::Text(text) => {
                    let event = match serde_json::from_str::<IncomingEvent>(&text) {
                        Ok(event) => event,
                        Err(e) => {
                            tracing::warn!("Unparsable server event: {} ({})", text, e);
                            continue;
                        }
                    };

                    match event {
                        IncomingEvent::Authenticated { success } => {
                            if success && !authenticated {
                                authenticated = true;
                                let join = OutgoingEvent::JoinRoom {
                                    course_id: course_id_for_read.clone(),
                                };
                                if out_tx_for_read.send(join).is_err() {
                                    return Err(ClientError::ConnectionError(
                                        "writer task gone".to_string(),
                                    ));
                                }
                            }
                        }
                        IncomingEvent::RoomJoined { course_id } => {
                            println!("Joined course room '{}'", course_id);
                            println!(
                                "Type messages and press Enter to send. \
                                 Prefix with @tag (task, theory, bug, project, question) \
                                 to label them. Ctrl+C exits."
                            );
                        }
                        IncomingEvent::MessageHistory { messages } => {
                            print!("{}", MessageFormatter::format_history(&messages));
                        }
                        IncomingEvent::ReceiveMessage(message) => {
                            print!("{}", MessageFormatter::format_chat_message(&message));
                        }
                        IncomingEvent::UserJoined { message, .. }
                        | IncomingEvent::UserLeft { message, .. } => {
                            print!("{}", MessageFormatter::format_presence(&message));
                        }
                        IncomingEvent::Error { message } => {
                            if !authenticated {
                                return Err(ClientError::AuthenticationFailed(message));
                            }
                            print!("{}", MessageFormatter::format_error(&message));
                        }
                    }
                }
                Message::Close(_) => {
                    tracing::info!("Server closed the connection");
                    return Err(ClientError::ConnectionError(
                        "server closed the connection".to_string(),
                    ));
                }
                _ => {}
            }
        }

        Err(ClientError::ConnectionError(
            "connection ended unexpectedly".to_string(),
        ))
    });

    // Relay stdin lines as chat messages. Ends at EOF (normal exit).
    let course_id_for_input = course_id.to_string();
    let mut input_task = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            let (tag, message) = parse_input_line(&line);
            let event = OutgoingEvent::SendMessage {
                course_id: course_id_for_input.clone(),
                message,
                tag,
            };
            if out_tx.send(event).is_err() {
                break;
            }
        }
    });

    // First task to finish decides the session outcome
    let result = tokio::select! {
        read_result = &mut read_task => {
            input_task.abort();
            match read_result {
                Ok(session_result) => session_result,
                Err(e) => Err(ClientError::ConnectionError(e.to_string())),
            }
        }
        _ = &mut input_task => {
            read_task.abort();
            Ok(())
        }
    };

    // With both producers gone the writer drains its queue and stops.
    let _ = writer_task.await;

    result
}
