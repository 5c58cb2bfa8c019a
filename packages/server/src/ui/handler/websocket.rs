//! WebSocket connection handler: the per-session protocol state machine.
//!
//! Each connection walks `Unauthenticated -> Authenticated -> Joined`.
//! Outbound traffic (replies, history, broadcasts from other sessions) all
//! flows through one mpsc channel drained by a writer task, so events reach
//! the socket in queue order. On close the channel is dropped first and the
//! writer awaited, which flushes a final error event before the socket goes
//! away.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{CourseId, SessionId, UserRole},
    infrastructure::dto::websocket::{ChatMessageDto, ClientEvent, ServerEvent},
    registry::{Member, MemberChannel},
    ui::state::AppState,
    usecase::AuthenticatedUser,
};

/// Protocol position of one connection
enum SessionState {
    Unauthenticated,
    Authenticated {
        user: AuthenticatedUser,
    },
    Joined {
        user: AuthenticatedUser,
        role: UserRole,
        course_id: CourseId,
    },
}

/// Whether the event loop keeps reading after handling one event
enum Flow {
    Continue,
    Close,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drains the session's outbound channel into the WebSocket sink.
///
/// Ends when the channel closes (event loop done) or the sink errors
/// (peer gone).
fn writer_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if sender.send(Message::Text(event.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Queue one event for delivery to this session
fn push_event(tx: &MemberChannel, event: &ServerEvent) {
    if tx.send(event.to_json()).is_err() {
        tracing::warn!("Failed to queue event for a closing session");
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = SessionId::generate();
    tracing::info!("Session {} connected", session_id);

    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();
    let writer = writer_loop(rx, sender);

    let mut session = SessionState::Unauthenticated;

    while let Some(message) = receiver.next().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Session {} transport error: {}", session_id, e);
                break;
            }
        };

        match message {
            Message::Text(text) => {
                let event = match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!("Session {} sent an unparsable event: {}", session_id, e);
                        push_event(&tx, &ServerEvent::error("unrecognized event"));
                        continue;
                    }
                };

                match handle_event(&state, session_id, &mut session, &tx, event).await {
                    Flow::Continue => {}
                    Flow::Close => break,
                }
            }
            Message::Close(_) => {
                tracing::info!("Session {} requested close", session_id);
                break;
            }
            // ping/pong is answered by the protocol layer
            _ => {}
        }
    }

    // Leaving the loop is the only exit path, so cleanup runs exactly once
    // per connection, whether the peer closed, the transport failed or the
    // protocol demanded a close.
    if let SessionState::Joined {
        user,
        role,
        course_id,
    } = &session
    {
        let presence = ServerEvent::user_left(&user.user_name, *role).to_json();
        state
            .disconnect_usecase
            .execute(course_id, session_id, &presence)
            .await;
    }

    // Dropping the channel lets the writer flush queued events and stop.
    drop(tx);
    let _ = writer.await;

    tracing::info!("Session {} closed", session_id);
}

async fn handle_event(
    state: &Arc<AppState>,
    session_id: SessionId,
    session: &mut SessionState,
    tx: &MemberChannel,
    event: ClientEvent,
) -> Flow {
    match event {
        ClientEvent::Authenticate { token } => {
            if !matches!(session, SessionState::Unauthenticated) {
                push_event(tx, &ServerEvent::error("already authenticated"));
                return Flow::Continue;
            }

            match state.authenticate_usecase.execute(&token).await {
                Ok(user) => {
                    tracing::info!(
                        "Session {} authenticated as '{}'",
                        session_id,
                        user.user_id.as_str()
                    );
                    push_event(tx, &ServerEvent::Authenticated { success: true });
                    *session = SessionState::Authenticated { user };
                    Flow::Continue
                }
                Err(e) => {
                    tracing::warn!("Session {} failed authentication: {}", session_id, e);
                    push_event(tx, &ServerEvent::error(e.to_string()));
                    Flow::Close
                }
            }
        }

        ClientEvent::JoinRoom { course_id } => {
            let user = match session {
                SessionState::Unauthenticated => {
                    push_event(tx, &ServerEvent::error("authenticate before joining a room"));
                    return Flow::Continue;
                }
                SessionState::Joined { .. } => {
                    push_event(tx, &ServerEvent::error("already joined a course room"));
                    return Flow::Continue;
                }
                SessionState::Authenticated { user } => user.clone(),
            };

            let course_id = match CourseId::new(course_id) {
                Ok(course_id) => course_id,
                Err(_) => {
                    push_event(tx, &ServerEvent::error("invalid course id"));
                    return Flow::Continue;
                }
            };

            let role = match state
                .join_room_usecase
                .authorize(&user.user_id, &course_id)
                .await
            {
                Ok(role) => role,
                Err(e) => {
                    push_event(tx, &ServerEvent::error(e.to_string()));
                    return Flow::Continue;
                }
            };

            // Reply first so the joiner sees room_joined ahead of any
            // broadcast delivered once membership takes effect.
            push_event(
                tx,
                &ServerEvent::RoomJoined {
                    course_id: course_id.as_str().to_string(),
                },
            );

            let member = Member::new(user.user_name.clone(), role, tx.clone());
            let presence = ServerEvent::user_joined(&user.user_name, role).to_json();
            // The history event is queued by the registry inside the room's
            // critical section, so no broadcast can slip in ahead of it.
            state
                .join_room_usecase
                .join(&course_id, session_id, member, &presence, |history| {
                    ServerEvent::MessageHistory {
                        messages: history.iter().map(ChatMessageDto::from).collect(),
                    }
                    .to_json()
                })
                .await;

            tracing::info!(
                "Session {} joined course '{}' as {}",
                session_id,
                course_id.as_str(),
                role
            );
            *session = SessionState::Joined {
                user,
                role,
                course_id,
            };
            Flow::Continue
        }

        ClientEvent::SendMessage {
            course_id,
            message,
            tag,
        } => {
            let (user, role, current) = match session {
                SessionState::Joined {
                    user,
                    role,
                    course_id,
                } => (user, *role, course_id),
                _ => {
                    push_event(
                        tx,
                        &ServerEvent::error("join a course room before sending messages"),
                    );
                    return Flow::Continue;
                }
            };

            if course_id != current.as_str() {
                push_event(tx, &ServerEvent::error("not joined to that course room"));
                return Flow::Continue;
            }

            if let Err(e) = state
                .send_message_usecase
                .execute(user, role, current, &message, tag.as_deref())
                .await
            {
                push_event(tx, &ServerEvent::error(e.to_string()));
            }
            Flow::Continue
        }
    }
}
