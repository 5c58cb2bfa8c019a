//! UseCase: joining a course room.
//!
//! Implements the access decision for room membership: the course's
//! instructor of record may always join; otherwise an active enrollment is
//! required. Both lookups run against external stores on every join attempt
//! (no caching, status can change between sessions), and any lookup failure
//! denies access rather than crashing the session.

use std::sync::Arc;

use crate::domain::{
    ChatMessage, CourseCatalog, CourseId, EnrollmentLedger, SessionId, UserId, UserRole,
};
use crate::registry::{Member, RoomRegistry};

use super::error::JoinRoomError;

pub struct JoinRoomUseCase {
    courses: Arc<dyn CourseCatalog>,
    enrollments: Arc<dyn EnrollmentLedger>,
    registry: Arc<RoomRegistry>,
}

impl JoinRoomUseCase {
    pub fn new(
        courses: Arc<dyn CourseCatalog>,
        enrollments: Arc<dyn EnrollmentLedger>,
        registry: Arc<RoomRegistry>,
    ) -> Self {
        Self {
            courses,
            enrollments,
            registry,
        }
    }

    /// Decide whether `user_id` may join `course_id`'s room, and with which
    /// role. Fails closed: lookup errors are logged and reported as the
    /// same generic denial a non-member gets.
    pub async fn authorize(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<UserRole, JoinRoomError> {
        match self.courses.instructor_of(course_id).await {
            Ok(Some(instructor_id)) if instructor_id == *user_id => {
                return Ok(UserRole::Instructor);
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(
                    "Course lookup failed for '{}', denying access: {}",
                    course_id.as_str(),
                    e
                );
                return Err(JoinRoomError::AccessDenied);
            }
        }

        match self.enrollments.is_enrolled(user_id, course_id).await {
            Ok(true) => Ok(UserRole::Student),
            Ok(false) => Err(JoinRoomError::AccessDenied),
            Err(e) => {
                tracing::warn!(
                    "Enrollment lookup failed for '{}'/'{}', denying access: {}",
                    user_id.as_str(),
                    course_id.as_str(),
                    e
                );
                Err(JoinRoomError::AccessDenied)
            }
        }
    }

    /// Register an authorized session in the room (creating it lazily).
    /// `presence_json` goes to the other current members only; the event
    /// rendered by `render_history` from the buffered history (oldest
    /// first) is queued to the joiner under the room's lock.
    pub async fn join(
        &self,
        course_id: &CourseId,
        session_id: SessionId,
        member: Member,
        presence_json: &str,
        render_history: impl FnOnce(&[ChatMessage]) -> String,
    ) {
        self.registry
            .join(course_id, session_id, member, presence_json, render_history)
            .await
    }
}
