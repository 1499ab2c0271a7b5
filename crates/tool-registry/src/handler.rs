//! Tool execution is dispatched through this trait; the registry itself only
//! knows names and schemas (§4.5 "individual implementations are out of
//! scope").

use async_trait::async_trait;
use browzer_types::ToolResult;
use serde_json::Value;

#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, name: &str, args: Value) -> ToolResult;
}

/// Default handler wired in until a real one (driving `browser-context`,
/// `action-recorder` and friends) is supplied; every call fails cleanly
/// rather than panicking.
#[derive(Default)]
pub struct UnimplementedHandler;

#[async_trait]
impl ToolHandler for UnimplementedHandler {
    async fn call(&self, name: &str, _args: Value) -> ToolResult {
        ToolResult::failure(format!("tool '{name}' has no implementation wired in"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unimplemented_handler_fails_cleanly() {
        let handler = UnimplementedHandler;
        let result = handler.call("click_element", Value::Null).await;
        assert!(!result.success);
    }
}
