//! Cross-cutting HTTP plumbing shared by Akeshya services.

pub mod config;
pub mod error;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
