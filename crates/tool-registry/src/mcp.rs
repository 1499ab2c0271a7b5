//! MCP-style JSON function-calling export (§4.5 `getToolsAsMCP`).

use browzer_types::ToolSchema;
use serde_json::{json, Value};

pub fn to_mcp_function(schema: &ToolSchema) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": schema.name,
            "description": schema.description,
            "parameters": schema.parameters,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_schema_in_function_calling_shape() {
        let schema = ToolSchema {
            name: "go_back".into(),
            description: "Navigate back".into(),
            parameters: json!({"type": "object", "properties": {}}),
        };
        let mcp = to_mcp_function(&schema);
        assert_eq!(mcp["type"], "function");
        assert_eq!(mcp["function"]["name"], "go_back");
    }
}
