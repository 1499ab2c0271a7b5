//! Core agentic execution engine for a desktop web-browsing AI assistant.
//!
//! This crate wires the component crates under `crates/` (browser context,
//! action recording, the ReAct loop, tool registry, LLM provider adapters,
//! context memory and chat sessions) behind a single
//! [`agent::AgentOrchestrator`] (§4.10).

pub mod agent;
pub mod config;
pub mod errors;

pub use agent::{AgentOrchestrator, ExecuteTaskOptions, GlobalStats};
pub use config::BrowzerConfig;
pub use errors::{OrchestratorError, OrchestratorResult};
