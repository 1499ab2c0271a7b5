//! ReAct Engine (§4.9).
//!
//! Drives the bounded Observe-Think-Act-Reflect-Record loop against a Tool
//! Registry, an LLM provider adapter and a Browser Context Provider,
//! publishing every thought/action/observation onto an `AgentEvent` bus for
//! the orchestrator (§4.10) and any attached UI to consume.

pub mod completion;
pub mod engine;
pub mod observation;
pub mod prompt;

pub use completion::classify_completion;
pub use engine::{EngineOutcome, ExecutionControl, ReactEngine, ReactEngineConfig};
pub use observation::summarize_observation;
pub use prompt::build_system_prompt;
