//! Course community chat server.
//!
//! Real-time chat rooms scoped to courses: authenticated WebSocket sessions,
//! authorization-gated room membership, bounded in-memory message history and
//! broadcast fan-out.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// chat core
pub mod auth;
pub mod registry;
