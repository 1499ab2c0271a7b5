//! Tool Registry (§4.5).
//!
//! Holds the fixed catalogue of tools available to the agent and exposes
//! them in the MCP function-calling shape LLM adapters forward; actual tool
//! bodies are injected via [`ToolHandler`].

pub mod catalogue;
pub mod errors;
pub mod handler;
pub mod mcp;
pub mod registry;

pub use catalogue::{all_tools, TOOL_COUNT};
pub use errors::{RegistryError, RegistryResult};
pub use handler::{ToolHandler, UnimplementedHandler};
pub use mcp::to_mcp_function;
pub use registry::ToolRegistry;
