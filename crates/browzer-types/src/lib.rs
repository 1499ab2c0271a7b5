//! Shared data model for the Browzer agentic execution engine.
//!
//! Every other crate in the workspace builds on the types defined here:
//! ids, the error type, and the data model described by the browser
//! context, action recorder, LLM, memory, chat session and ReAct engine
//! components.

#![allow(dead_code)]

pub mod action;
pub mod browser;
pub mod chat;
pub mod error;
pub mod ids;
pub mod llm;
pub mod memory;
pub mod orchestrator;
pub mod react;

pub use action::*;
pub use browser::*;
pub use chat::*;
pub use error::{BrowzerError, BrowzerResult};
pub use ids::*;
pub use llm::*;
pub use memory::*;
pub use orchestrator::*;
pub use react::*;
