//! Shared utilities for the Seminar chat server and client.

pub mod logger;
pub mod time;
