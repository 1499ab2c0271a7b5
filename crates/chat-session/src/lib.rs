//! Chat Session Manager (§4.8): a per-session append-only message log,
//! recorded turns and running statistics, with optional persistence
//! dispatched on every mutation.

pub mod manager;
pub mod persistence;

pub use manager::{recording_context_message, ChatSessionManager};
pub use persistence::{NoopPersistence, SessionPersistence};
