//! Lookup traits for the external collaborators of the chat core.
//!
//! The chat core does not own user, course or enrollment records; it
//! consumes them through these interfaces. Concrete implementations live in
//! the infrastructure layer (dependency inversion). Every join re-checks
//! access through these lookups, since instructor and enrollment status can
//! change between sessions.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use super::model::{CourseId, UserId};

/// Failure of an external lookup store.
///
/// Authorization treats any of these as a denial (fail-closed); they are
/// logged but never surfaced to clients as infrastructure detail.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    #[error("lookup store unavailable: {0}")]
    Unavailable(String),
    #[error("malformed identifier: {0}")]
    MalformedId(String),
}

/// User-by-id lookup (returns the display name)
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn display_name(&self, user_id: &UserId) -> Result<Option<String>, LookupError>;
}

/// Course-by-id lookup (returns the instructor of record)
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CourseCatalog: Send + Sync {
    async fn instructor_of(&self, course_id: &CourseId) -> Result<Option<UserId>, LookupError>;
}

/// Active-enrollment lookup for a user/course pair
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EnrollmentLedger: Send + Sync {
    async fn is_enrolled(&self, user_id: &UserId, course_id: &CourseId)
        -> Result<bool, LookupError>;
}
