//! Domain model for the course chat core.

mod error;
mod lookup;
mod model;

pub use error::DomainError;
pub use lookup::{CourseCatalog, EnrollmentLedger, LookupError, UserDirectory};
#[cfg(test)]
pub use lookup::{MockCourseCatalog, MockEnrollmentLedger, MockUserDirectory};
pub use model::{
    ChatMessage, CourseId, MessageBody, MessageTag, SessionId, UserId, UserRole, MAX_MESSAGE_CHARS,
};
