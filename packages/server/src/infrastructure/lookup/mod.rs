//! Concrete implementations of the domain lookup traits.

pub mod inmemory;
