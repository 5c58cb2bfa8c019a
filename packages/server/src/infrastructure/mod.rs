//! Infrastructure layer: wire DTOs and concrete lookup implementations.

pub mod dto;
pub mod lookup;
