//! Context Memory Manager (§4.7): token estimation, the four compression
//! strategies, and a per-session relevance-ranked memory store. Produces
//! derived, token-budgeted views per turn — per §9's memory-vs-session
//! separation, callers must never persist the optimized view back into the
//! chat session log.

pub mod compression;
pub mod store;
pub mod tokens;

pub use compression::{optimize_messages, CompressionStrategy, OptimizationResult};
pub use store::{MemoryStore, MemoryStoreStats};
pub use tokens::{average_tokens_per_message, estimate_tokens};
