//! Process-wide room registry: membership, bounded history, broadcast fan-out.
//!
//! Rooms are created lazily on first join and keyed by course id. Membership
//! changes, history appends and fan-out for one room all run under that
//! room's lock, so every member observes messages in append order and a
//! leaving session can never receive a broadcast that started after its
//! removal. Operations on different rooms proceed in parallel.
//!
//! Rooms are never evicted; memory is bounded by the per-room history cap
//! and the number of distinct courses ever chatted in.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::domain::{ChatMessage, CourseId, SessionId, UserRole};

/// Bound on each room's in-memory history buffer
pub const ROOM_HISTORY_CAPACITY: usize = 100;

/// Channel used to push serialized events to one connection
pub type MemberChannel = mpsc::UnboundedSender<String>;

/// One joined session, as seen by the room
pub struct Member {
    pub user_name: String,
    pub user_role: UserRole,
    sender: MemberChannel,
}

impl Member {
    pub fn new(user_name: String, user_role: UserRole, sender: MemberChannel) -> Self {
        Self {
            user_name,
            user_role,
            sender,
        }
    }

    fn push(&self, content: &str) -> bool {
        self.sender.send(content.to_string()).is_ok()
    }
}

#[derive(Default)]
struct RoomState {
    history: VecDeque<ChatMessage>,
    members: HashMap<SessionId, Member>,
}

impl RoomState {
    fn broadcast(&self, content: &str, exclude: Option<SessionId>) {
        for (session_id, member) in &self.members {
            if Some(*session_id) == exclude {
                continue;
            }
            if !member.push(content) {
                tracing::warn!("Failed to push event to session {}", session_id);
            }
        }
    }
}

/// Summary of one room for the observability surface
#[derive(Debug, Clone)]
pub struct RoomSummary {
    pub course_id: CourseId,
    pub member_names: Vec<String>,
    pub message_count: usize,
}

/// Map of course id to live room state.
///
/// Constructed once at startup and handed to every connection handler by
/// `Arc`; holds the only shared mutable state of the chat core.
pub struct RoomRegistry {
    rooms: Mutex<HashMap<CourseId, Arc<Mutex<RoomState>>>>,
    history_capacity: usize,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::with_history_capacity(ROOM_HISTORY_CAPACITY)
    }

    /// Registry with a custom per-room history bound (used by tests)
    pub fn with_history_capacity(history_capacity: usize) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            history_capacity,
        }
    }

    /// Get or lazily create the room for a course
    async fn room(&self, course_id: &CourseId) -> Arc<Mutex<RoomState>> {
        let mut rooms = self.rooms.lock().await;
        rooms
            .entry(course_id.clone())
            .or_insert_with(|| {
                tracing::info!("Room created for course '{}'", course_id.as_str());
                Arc::new(Mutex::new(RoomState::default()))
            })
            .clone()
    }

    async fn find_room(&self, course_id: &CourseId) -> Option<Arc<Mutex<RoomState>>> {
        let rooms = self.rooms.lock().await;
        rooms.get(course_id).cloned()
    }

    /// Register a session in a room. `presence_json` is delivered to every
    /// *other* current member. The event produced by `render_history` (from
    /// the buffered history, oldest first) is queued to the joiner inside
    /// the same critical section as the membership insert, so no broadcast
    /// can reach the joiner ahead of its history snapshot.
    pub async fn join(
        &self,
        course_id: &CourseId,
        session_id: SessionId,
        member: Member,
        presence_json: &str,
        render_history: impl FnOnce(&[ChatMessage]) -> String,
    ) {
        let room = self.room(course_id).await;
        let mut state = room.lock().await;

        state.broadcast(presence_json, None);

        let history: Vec<ChatMessage> = state.history.iter().cloned().collect();
        if !member.push(&render_history(&history)) {
            tracing::warn!("Failed to push history to session {}", session_id);
        }
        state.members.insert(session_id, member);
    }

    /// Append a message to the room's history (evicting the oldest entry
    /// past the cap) and deliver `json` to every member, sender included.
    pub async fn publish(&self, course_id: &CourseId, message: ChatMessage, json: &str) {
        let room = self.room(course_id).await;
        let mut state = room.lock().await;

        while state.history.len() >= self.history_capacity {
            state.history.pop_front();
        }
        state.history.push_back(message);

        state.broadcast(json, None);
    }

    /// Remove a session from a room. Returns `true` when the session was a
    /// member, in which case `presence_json` is delivered to the remaining
    /// members. Safe to call for sessions that never joined.
    pub async fn leave(
        &self,
        course_id: &CourseId,
        session_id: SessionId,
        presence_json: &str,
    ) -> bool {
        let Some(room) = self.find_room(course_id).await else {
            return false;
        };
        let mut state = room.lock().await;

        if state.members.remove(&session_id).is_none() {
            return false;
        }

        state.broadcast(presence_json, None);
        true
    }

    /// Number of sessions currently joined to a course room
    pub async fn member_count(&self, course_id: &CourseId) -> usize {
        match self.find_room(course_id).await {
            Some(room) => room.lock().await.members.len(),
            None => 0,
        }
    }

    /// Snapshot of a room's history, oldest first
    pub async fn history(&self, course_id: &CourseId) -> Vec<ChatMessage> {
        match self.find_room(course_id).await {
            Some(room) => room.lock().await.history.iter().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Summaries of all rooms, for the HTTP observability surface
    pub async fn summaries(&self) -> Vec<RoomSummary> {
        let rooms: Vec<(CourseId, Arc<Mutex<RoomState>>)> = {
            let rooms = self.rooms.lock().await;
            rooms
                .iter()
                .map(|(id, room)| (id.clone(), room.clone()))
                .collect()
        };

        let mut summaries = Vec::with_capacity(rooms.len());
        for (course_id, room) in rooms {
            let state = room.lock().await;
            let mut member_names: Vec<String> = state
                .members
                .values()
                .map(|m| m.user_name.clone())
                .collect();
            member_names.sort();
            summaries.push(RoomSummary {
                course_id,
                member_names,
                message_count: state.history.len(),
            });
        }
        summaries.sort_by(|a, b| a.course_id.as_str().cmp(b.course_id.as_str()));
        summaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageBody, UserId};

    fn course(id: &str) -> CourseId {
        CourseId::new(id.to_string()).unwrap()
    }

    fn message(user: &str, body: &str) -> ChatMessage {
        ChatMessage::new(
            UserId::new(user.to_string()).unwrap(),
            user.to_string(),
            UserRole::Student,
            MessageBody::new(body.to_string()).unwrap(),
            None,
            1000,
        )
    }

    fn member(name: &str) -> (Member, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Member::new(name.to_string(), UserRole::Student, tx), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_join_delivers_history_snapshot_oldest_first() {
        // given:
        let registry = RoomRegistry::new();
        let course_id = course("rust-101");
        registry
            .publish(&course_id, message("ada", "first"), "{\"n\":1}")
            .await;
        registry
            .publish(&course_id, message("ada", "second"), "{\"n\":2}")
            .await;

        // when:
        let (m, mut rx) = member("grace");
        registry
            .join(
                &course_id,
                SessionId::generate(),
                m,
                "{\"presence\":1}",
                |history| {
                    let bodies: Vec<&str> = history.iter().map(|m| m.body.as_str()).collect();
                    bodies.join(",")
                },
            )
            .await;

        // then: the rendered history lands in the joiner's channel
        assert_eq!(drain(&mut rx), vec!["first,second".to_string()]);
    }

    #[tokio::test]
    async fn test_join_notifies_other_members_but_not_the_joiner() {
        // given:
        let registry = RoomRegistry::new();
        let course_id = course("rust-101");
        let (ada, mut ada_rx) = member("ada");
        registry
            .join(&course_id, SessionId::generate(), ada, "ada joined", |_| {
                "h".to_string()
            })
            .await;
        drain(&mut ada_rx);

        // when:
        let (grace, mut grace_rx) = member("grace");
        registry
            .join(&course_id, SessionId::generate(), grace, "grace joined", |_| {
                "h".to_string()
            })
            .await;

        // then: ada hears the presence event, grace only gets her history
        assert_eq!(drain(&mut ada_rx), vec!["grace joined".to_string()]);
        assert_eq!(drain(&mut grace_rx), vec!["h".to_string()]);
    }

    #[tokio::test]
    async fn test_join_delivers_history_before_any_racing_broadcast() {
        // given: a stream of publishes racing the join
        let registry = Arc::new(RoomRegistry::new());
        let course_id = course("rust-101");
        let publisher = {
            let registry = registry.clone();
            let course_id = course_id.clone();
            tokio::spawn(async move {
                for i in 0..50 {
                    let json = format!("msg {i}");
                    registry
                        .publish(&course_id, message("ada", &json), &json)
                        .await;
                }
            })
        };

        // when: a member joins mid-stream
        let (grace, mut grace_rx) = member("grace");
        registry
            .join(&course_id, SessionId::generate(), grace, "p", |history| {
                let bodies: Vec<&str> = history.iter().map(|m| m.body.as_str()).collect();
                format!("history:{}", bodies.join(","))
            })
            .await;
        publisher.await.unwrap();

        // then: the history snapshot is the first event the joiner sees,
        // and every published message reaches the joiner exactly once,
        // either inside that snapshot or as a broadcast after it
        let events = drain(&mut grace_rx);
        let history = events.first().expect("joiner received no events");
        assert!(history.starts_with("history:"));

        let mut seen: Vec<String> = history
            .trim_start_matches("history:")
            .split(',')
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();
        seen.extend(events[1..].iter().cloned());
        let expected: Vec<String> = (0..50).map(|i| format!("msg {i}")).collect();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn test_publish_reaches_all_members_including_sender() {
        // given:
        let registry = RoomRegistry::new();
        let course_id = course("rust-101");
        let (ada, mut ada_rx) = member("ada");
        let (grace, mut grace_rx) = member("grace");
        registry
            .join(&course_id, SessionId::generate(), ada, "p", |_| "h".to_string())
            .await;
        registry
            .join(&course_id, SessionId::generate(), grace, "p", |_| "h".to_string())
            .await;
        drain(&mut ada_rx);
        drain(&mut grace_rx);

        // when:
        registry
            .publish(&course_id, message("ada", "hello"), "{\"msg\":\"hello\"}")
            .await;

        // then:
        assert_eq!(drain(&mut ada_rx), vec!["{\"msg\":\"hello\"}".to_string()]);
        assert_eq!(drain(&mut grace_rx), vec!["{\"msg\":\"hello\"}".to_string()]);
    }

    #[tokio::test]
    async fn test_history_bound_keeps_most_recent_entries() {
        // given:
        let registry = RoomRegistry::new();
        let course_id = course("rust-101");

        // when:
        for i in 0..150 {
            registry
                .publish(&course_id, message("ada", &format!("msg {i}")), "{}")
                .await;
        }

        // then:
        let history = registry.history(&course_id).await;
        assert_eq!(history.len(), ROOM_HISTORY_CAPACITY);
        assert_eq!(history[0].body.as_str(), "msg 50");
        assert_eq!(history[99].body.as_str(), "msg 149");
    }

    #[tokio::test]
    async fn test_concurrent_publishes_are_observed_in_one_total_order() {
        // given:
        let registry = Arc::new(RoomRegistry::new());
        let course_id = course("rust-101");
        let (ada, mut ada_rx) = member("ada");
        let (grace, mut grace_rx) = member("grace");
        registry
            .join(&course_id, SessionId::generate(), ada, "p", |_| "h".to_string())
            .await;
        registry
            .join(&course_id, SessionId::generate(), grace, "p", |_| "h".to_string())
            .await;
        drain(&mut ada_rx);
        drain(&mut grace_rx);

        // when: two senders race 25 messages each into the same room
        let mut tasks = Vec::new();
        for sender in ["s1", "s2"] {
            let registry = registry.clone();
            let course_id = course_id.clone();
            tasks.push(tokio::spawn(async move {
                for i in 0..25 {
                    let json = format!("{{\"from\":\"{sender}\",\"n\":{i}}}");
                    registry
                        .publish(&course_id, message(sender, &format!("{sender} {i}")), &json)
                        .await;
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        // then: both members saw the same 50 events in the same order,
        // matching the append order of the history buffer
        let ada_events = drain(&mut ada_rx);
        let grace_events = drain(&mut grace_rx);
        assert_eq!(ada_events.len(), 50);
        assert_eq!(ada_events, grace_events);

        let history = registry.history(&course_id).await;
        let history_order: Vec<String> = history
            .iter()
            .map(|m| {
                let (sender, n) = m.body.as_str().split_once(' ').unwrap();
                format!("{{\"from\":\"{sender}\",\"n\":{n}}}")
            })
            .collect();
        assert_eq!(ada_events, history_order);
    }

    #[tokio::test]
    async fn test_leave_is_idempotent_and_notifies_once() {
        // given:
        let registry = RoomRegistry::new();
        let course_id = course("rust-101");
        let (ada, mut ada_rx) = member("ada");
        let (grace, _grace_rx) = member("grace");
        let grace_session = SessionId::generate();
        registry
            .join(&course_id, SessionId::generate(), ada, "p", |_| "h".to_string())
            .await;
        registry
            .join(&course_id, grace_session, grace, "p", |_| "h".to_string())
            .await;
        drain(&mut ada_rx);

        // when:
        let first = registry.leave(&course_id, grace_session, "grace left").await;
        let second = registry.leave(&course_id, grace_session, "grace left").await;

        // then:
        assert!(first);
        assert!(!second);
        assert_eq!(drain(&mut ada_rx), vec!["grace left".to_string()]);
    }

    #[tokio::test]
    async fn test_leave_on_unknown_room_is_a_noop() {
        // given:
        let registry = RoomRegistry::new();

        // when:
        let removed = registry
            .leave(&course("ghost-999"), SessionId::generate(), "left")
            .await;

        // then:
        assert!(!removed);
        assert_eq!(registry.summaries().await.len(), 0);
    }

    #[tokio::test]
    async fn test_summaries_report_members_and_message_counts() {
        // given:
        let registry = RoomRegistry::new();
        let course_id = course("rust-101");
        let (ada, _ada_rx) = member("ada");
        registry
            .join(&course_id, SessionId::generate(), ada, "p", |_| "h".to_string())
            .await;
        registry.publish(&course_id, message("ada", "hi"), "{}").await;

        // when:
        let summaries = registry.summaries().await;

        // then:
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].course_id.as_str(), "rust-101");
        assert_eq!(summaries[0].member_names, vec!["ada".to_string()]);
        assert_eq!(summaries[0].message_count, 1);
        assert_eq!(registry.member_count(&course_id).await, 1);
    }
}
