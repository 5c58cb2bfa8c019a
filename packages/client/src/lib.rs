//! CLI chat client for Seminar course rooms.

pub mod error;
pub mod event;
pub mod formatter;
pub mod session;
