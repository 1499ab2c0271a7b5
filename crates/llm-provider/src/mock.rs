//! Deterministic adapter for offline development and integration tests,
//! mirroring the donor kernel's `MockLlmProvider` (which returned a fixed
//! action sequence so agent-loop tests didn't need live credentials) but
//! speaking the unified §4.6 contract instead of the old `decide()` call.

use async_trait::async_trait;
use parking_lot::Mutex;

use browzer_types::{
    BrowzerResult, FinishReason, LlmRequest, LlmResponse, Message, ProviderCapabilities,
    StreamChunk, TokenUsage, ToolCall,
};

use crate::provider::{LlmProviderAdapter, StreamSink};
use crate::stats::{ProviderStats, ProviderStatsSnapshot};

/// One scripted reply: either plain text or a single tool call, returned in
/// order on each call to `generate_completion`/`stream_completion`. Once the
/// script is exhausted, the adapter repeats a canned "task complete" reply
/// so long-running loop tests terminate instead of panicking.
#[derive(Clone, Debug)]
pub enum MockReply {
    Text(String),
    ToolCall { name: String, arguments: serde_json::Value },
}

pub struct MockAdapter {
    script: Mutex<Vec<MockReply>>,
    stats: ProviderStats,
}

impl MockAdapter {
    pub fn new(script: Vec<MockReply>) -> Self {
        Self { script: Mutex::new(script), stats: ProviderStats::new() }
    }

    /// Always reports the goal achieved on the first call; useful for
    /// exercising the happy path of the ReAct loop without scripting.
    pub fn immediate_completion(message: impl Into<String>) -> Self {
        Self::new(vec![MockReply::Text(message.into())])
    }

    fn next_reply(&self) -> MockReply {
        let mut script = self.script.lock();
        if script.is_empty() {
            MockReply::Text("Task complete.".to_string())
        } else {
            script.remove(0)
        }
    }

    fn build_response(&self, reply: MockReply) -> LlmResponse {
        let (message, finish_reason) = match reply {
            MockReply::Text(text) => (Message::assistant(text), FinishReason::Stop),
            MockReply::ToolCall { name, arguments } => {
                let mut message = Message::assistant(String::new());
                message.tool_calls.push(ToolCall::new(uuid::Uuid::new_v4().to_string(), name, arguments));
                (message, FinishReason::ToolCalls)
            }
        };
        LlmResponse {
            id: format!("mock-{}", uuid::Uuid::new_v4()),
            model: "mock-model".to_string(),
            provider: "mock".to_string(),
            message,
            usage: Some(TokenUsage::new(10, 10)),
            finish_reason,
        }
    }
}

#[async_trait]
impl LlmProviderAdapter for MockAdapter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate_completion(&self, _request: &LlmRequest) -> BrowzerResult<LlmResponse> {
        let response = self.build_response(self.next_reply());
        self.stats.record_success(response.usage.unwrap_or_default(), 0.0, 1);
        Ok(response)
    }

    async fn stream_completion(
        &self,
        _request: &LlmRequest,
        on_chunk: &mut StreamSink<'_>,
    ) -> BrowzerResult<LlmResponse> {
        on_chunk(StreamChunk::MessageStart);
        let response = self.build_response(self.next_reply());
        if let Some(text) = response.message.tool_calls.is_empty().then(|| response.message.content.as_text()) {
            on_chunk(StreamChunk::TextDelta { text });
        }
        for tool_call in &response.message.tool_calls {
            on_chunk(StreamChunk::ToolCallComplete { tool_call: tool_call.clone() });
        }
        self.stats.record_success(response.usage.unwrap_or_default(), 0.0, 1);
        on_chunk(StreamChunk::MessageComplete { response: response.clone() });
        Ok(response)
    }

    fn get_capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_tools: true,
            supports_vision: true,
            supports_streaming: true,
            max_context_tokens: 200_000,
        }
    }

    fn list_models(&self) -> Vec<String> {
        vec!["mock-model".to_string()]
    }

    fn stats(&self) -> ProviderStatsSnapshot {
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_script_in_order_then_repeats_completion() {
        let adapter = MockAdapter::new(vec![
            MockReply::ToolCall { name: "navigate_to_url".to_string(), arguments: serde_json::json!({"url": "https://x"}) },
            MockReply::Text("done".to_string()),
        ]);
        let request = LlmRequest::new(vec![Message::user("go")]);

        let first = adapter.generate_completion(&request).await.unwrap();
        assert_eq!(first.finish_reason, FinishReason::ToolCalls);

        let second = adapter.generate_completion(&request).await.unwrap();
        assert_eq!(second.message.content.as_text(), "done");

        let third = adapter.generate_completion(&request).await.unwrap();
        assert_eq!(third.message.content.as_text(), "Task complete.");
        assert_eq!(adapter.stats().requests, 3);
    }
}
