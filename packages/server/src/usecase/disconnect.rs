//! UseCase: session disconnect cleanup.

use std::sync::Arc;

use crate::domain::{CourseId, SessionId};
use crate::registry::RoomRegistry;

pub struct DisconnectUseCase {
    registry: Arc<RoomRegistry>,
}

impl DisconnectUseCase {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self { registry }
    }

    /// Remove the session from its room and notify the remaining members.
    ///
    /// Idempotent: a session that already left (or never joined the room)
    /// is a no-op and emits no presence event. Returns `true` when the
    /// session was actually removed.
    pub async fn execute(
        &self,
        course_id: &CourseId,
        session_id: SessionId,
        presence_json: &str,
    ) -> bool {
        let removed = self.registry.leave(course_id, session_id, presence_json).await;
        if removed {
            tracing::info!(
                "Session {} removed from course '{}' room",
                session_id,
                course_id.as_str()
            );
        }
        removed
    }
}
