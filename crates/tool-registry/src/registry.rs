//! Tool Registry (§4.5): a name→schema catalogue plus dispatch to whatever
//! [`ToolHandler`] the embedder wires in.

use std::sync::Arc;

use browzer_types::{ToolResult, ToolSchema};
use dashmap::DashMap;
use serde_json::Value;
use tracing::warn;

use crate::catalogue::all_tools;
use crate::errors::{RegistryError, RegistryResult};
use crate::handler::{ToolHandler, UnimplementedHandler};
use crate::mcp::to_mcp_function;

pub struct ToolRegistry {
    tools: DashMap<String, ToolSchema>,
    handler: Arc<dyn ToolHandler>,
}

impl ToolRegistry {
    pub fn new(handler: Arc<dyn ToolHandler>) -> Self {
        let tools = DashMap::new();
        for schema in all_tools() {
            tools.insert(schema.name.clone(), schema);
        }
        Self { tools, handler }
    }

    pub fn with_unimplemented_handler() -> Self {
        Self::new(Arc::new(UnimplementedHandler))
    }

    pub fn get_tool(&self, name: &str) -> RegistryResult<ToolSchema> {
        self.tools
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RegistryError::UnknownTool(name.to_string()))
    }

    pub fn list_tools(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|entry| entry.value().clone()).collect()
    }

    /// `getToolsAsMCP` (§4.5): the schema list in the JSON-function-calling
    /// shape LLM adapters forward directly as the `tools` field of a request.
    pub fn get_tools_as_mcp(&self) -> Vec<Value> {
        self.tools.iter().map(|entry| to_mcp_function(entry.value())).collect()
    }

    /// `executeTool(name, args)` (§4.5): dispatches to the handler if the
    /// tool is known, otherwise returns a failed `ToolResult` rather than an
    /// error, since this is meant to be fed straight back to the LLM loop.
    pub async fn execute_tool(&self, name: &str, args: Value) -> ToolResult {
        if !self.tools.contains_key(name) {
            warn!(tool = name, "execute_tool called for an unregistered tool");
            return ToolResult::failure(format!("unknown tool: {name}"));
        }
        self.handler.call(name, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::TOOL_COUNT;
    use async_trait::async_trait;

    struct Echo;
    #[async_trait]
    impl ToolHandler for Echo {
        async fn call(&self, name: &str, args: Value) -> ToolResult {
            ToolResult::ok(Some(args), format!("called {name}"))
        }
    }

    #[test]
    fn lists_all_catalogued_tools() {
        let registry = ToolRegistry::with_unimplemented_handler();
        assert_eq!(registry.list_tools().len(), TOOL_COUNT);
        assert_eq!(registry.get_tools_as_mcp().len(), TOOL_COUNT);
    }

    #[tokio::test]
    async fn unknown_tool_fails_without_panicking() {
        let registry = ToolRegistry::with_unimplemented_handler();
        let result = registry.execute_tool("delete_universe", Value::Null).await;
        assert!(!result.success);
    }

    #[tokio::test]
    async fn known_tool_dispatches_to_handler() {
        let registry = ToolRegistry::new(Arc::new(Echo));
        let result = registry.execute_tool("go_back", Value::Null).await;
        assert!(result.success);
        assert_eq!(result.message.as_deref(), Some("called go_back"));
    }
}
