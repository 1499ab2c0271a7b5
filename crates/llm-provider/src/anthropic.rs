//! Anthropic Messages API adapter, grounded on the donor kernel's
//! `llm/llm/anthropic.rs` (bearer-style auth header, JSON request/response
//! shape) generalized from a single-shot planner call to the full §4.6
//! unified contract (messages, tools, streaming, usage/cost accounting).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use browzer_types::{
    BrowzerError, BrowzerResult, ContentPart, FinishReason, LlmRequest, LlmResponse, Message,
    MessageContent, ModelRates, ProviderCapabilities, Role, StreamChunk, TokenUsage, ToolCall,
};

use crate::provider::{LlmProviderAdapter, StreamSink};
use crate::retry::{self, RetryPolicy};
use crate::stats::{ProviderStats, ProviderStatsSnapshot};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Clone, Debug)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub retry_policy: RetryPolicy,
    pub rates: ModelRates,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "claude-sonnet-4-5".to_string(),
            api_base: "https://api.anthropic.com/v1".to_string(),
            max_tokens: 4096,
            timeout: Duration::from_secs(60),
            retry_policy: RetryPolicy::default(),
            rates: ModelRates {
                input_per_million: 3.0,
                output_per_million: 15.0,
            },
        }
    }
}

pub struct AnthropicAdapter {
    client: reqwest::Client,
    config: AnthropicConfig,
    stats: ProviderStats,
}

impl AnthropicAdapter {
    pub fn new(config: AnthropicConfig) -> BrowzerResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(BrowzerError::Authentication(
                "missing ANTHROPIC_API_KEY".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| BrowzerError::internal(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { client, config, stats: ProviderStats::new() })
    }

    fn build_body(&self, request: &LlmRequest, stream: bool) -> ClaudeRequest {
        let system = request.system_prompt.clone().unwrap_or_default();
        let messages = request
            .messages
            .iter()
            .filter(|m| !m.is_system())
            .map(to_claude_message)
            .collect();
        let tools = request
            .tools
            .iter()
            .map(|t| ClaudeTool {
                name: t.name.clone(),
                description: t.description.clone(),
                input_schema: t.parameters.clone(),
            })
            .collect::<Vec<_>>();
        ClaudeRequest {
            model: request.model.clone().unwrap_or_else(|| self.config.model.clone()),
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            temperature: request.temperature,
            system,
            messages,
            tools: if tools.is_empty() { None } else { Some(tools) },
            stream,
            stop_sequences: if request.stop_sequences.is_empty() {
                None
            } else {
                Some(request.stop_sequences.clone())
            },
        }
    }

    async fn send(&self, request: &LlmRequest) -> BrowzerResult<ClaudeResponse> {
        let url = format!("{}/messages", self.config.api_base.trim_end_matches('/'));
        let body = self.build_body(request, false);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;
        parse_response(response).await
    }
}

#[async_trait]
impl LlmProviderAdapter for AnthropicAdapter {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate_completion(&self, request: &LlmRequest) -> BrowzerResult<LlmResponse> {
        let started = Instant::now();
        let result = retry::with_retries(self.config.retry_policy, || self.send(request)).await;
        let latency_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(response) => {
                let unified = into_unified(response, &self.config.model);
                if let Some(usage) = unified.usage {
                    let cost = self.config.rates.cost(usage);
                    self.stats.record_success(usage, cost, latency_ms);
                }
                Ok(unified)
            }
            Err(err) => {
                self.stats.record_failure(retry::error_code(&err), latency_ms);
                Err(err)
            }
        }
    }

    async fn stream_completion(
        &self,
        request: &LlmRequest,
        on_chunk: &mut StreamSink<'_>,
    ) -> BrowzerResult<LlmResponse> {
        let started = Instant::now();
        on_chunk(StreamChunk::MessageStart);

        let url = format!("{}/messages", self.config.api_base.trim_end_matches('/'));
        let body = self.build_body(request, true);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        if !response.status().is_success() {
            let err = status_to_error(response).await;
            let latency_ms = started.elapsed().as_millis() as u64;
            self.stats.record_failure(retry::error_code(&err), latency_ms);
            on_chunk(StreamChunk::Error { message: err.to_string() });
            return Err(err);
        }

        let mut text = String::new();
        let mut stop_reason = "end_turn".to_string();
        let mut usage = TokenUsage::default();
        let mut byte_stream = response.bytes_stream();
        let mut buffer = String::new();

        while let Some(chunk) = byte_stream.next().await {
            let bytes = chunk.map_err(|err| BrowzerError::Stream(err.to_string()))?;
            buffer.push_str(&String::from_utf8_lossy(&bytes));
            while let Some(pos) = buffer.find("\n\n") {
                let event = buffer[..pos].to_string();
                buffer.drain(..pos + 2);
                if let Some(data) = event.strip_prefix("data: ").or_else(|| event.strip_prefix("data:")) {
                    if let Ok(value) = serde_json::from_str::<JsonValue>(data.trim()) {
                        match value.get("type").and_then(|t| t.as_str()) {
                            Some("content_block_delta") => {
                                if let Some(delta_text) =
                                    value["delta"]["text"].as_str()
                                {
                                    text.push_str(delta_text);
                                    on_chunk(StreamChunk::TextDelta { text: delta_text.to_string() });
                                }
                            }
                            Some("message_delta") => {
                                if let Some(reason) = value["delta"]["stop_reason"].as_str() {
                                    stop_reason = reason.to_string();
                                }
                                if let Some(output) = value["usage"]["output_tokens"].as_u64() {
                                    usage.output = output as u32;
                                }
                            }
                            Some("message_start") => {
                                if let Some(input) = value["message"]["usage"]["input_tokens"].as_u64() {
                                    usage.input = input as u32;
                                }
                            }
                            _ => {}
                        }
                    }
                }
            }
        }
        usage.total = usage.input + usage.output;

        let message = Message::assistant(text);
        let response = LlmResponse {
            id: format!("anthropic-stream-{}", chrono::Utc::now().timestamp_millis()),
            model: self.config.model.clone(),
            provider: "anthropic".to_string(),
            message,
            usage: Some(usage),
            finish_reason: map_stop_reason(&stop_reason),
        };
        let latency_ms = started.elapsed().as_millis() as u64;
        self.stats.record_success(usage, self.config.rates.cost(usage), latency_ms);
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
        vec![
            "claude-opus-4-5".to_string(),
            "claude-sonnet-4-5".to_string(),
            "claude-haiku-4-5".to_string(),
        ]
    }

    fn stats(&self) -> ProviderStatsSnapshot {
        self.stats.snapshot()
    }
}

fn to_claude_message(message: &Message) -> ClaudeMessage {
    let role = match message.role {
        Role::Assistant => "assistant",
        _ => "user",
    };
    let content = match &message.content {
        MessageContent::Text(text) => vec![ClaudeContentBlock::Text { text: text.clone() }],
        MessageContent::Parts(parts) => parts
            .iter()
            .map(|part| match part {
                ContentPart::Text { text } => ClaudeContentBlock::Text { text: text.clone() },
                ContentPart::Image { url } => ClaudeContentBlock::Image {
                    source: ClaudeImageSource {
                        r#type: "base64".to_string(),
                        media_type: "image/png".to_string(),
                        data: url.clone(),
                    },
                },
            })
            .collect(),
    };
    ClaudeMessage { role: role.to_string(), content }
}

fn into_unified(response: ClaudeResponse, default_model: &str) -> LlmResponse {
    let mut text = String::new();
    let mut tool_calls = Vec::new();
    for block in &response.content {
        match block {
            ClaudeResponseBlock::Text { text: t } => text.push_str(t),
            ClaudeResponseBlock::ToolUse { id, name, input } => {
                tool_calls.push(ToolCall::new(id.clone(), name.clone(), input.clone()));
            }
        }
    }
    let content = if tool_calls.is_empty() {
        MessageContent::Text(text)
    } else {
        MessageContent::Text(text)
    };
    let message = Message {
        role: Role::Assistant,
        content,
        tool_calls,
        tool_call_id: None,
        name: None,
    };
    let usage = response.usage.map(|u| TokenUsage::new(u.input_tokens, u.output_tokens));
    LlmResponse {
        id: response.id,
        model: response.model.unwrap_or_else(|| default_model.to_string()),
        provider: "anthropic".to_string(),
        finish_reason: map_stop_reason(response.stop_reason.as_deref().unwrap_or("end_turn")),
        message,
        usage,
    }
}

fn map_stop_reason(reason: &str) -> FinishReason {
    match reason {
        "max_tokens" => FinishReason::Length,
        "tool_use" => FinishReason::ToolCalls,
        "stop_sequence" | "end_turn" => FinishReason::Stop,
        _ => FinishReason::Stop,
    }
}

fn classify_transport_error(err: reqwest::Error) -> BrowzerError {
    if err.is_timeout() {
        BrowzerError::timeout("anthropic request", 0)
    } else {
        BrowzerError::Network(err.to_string())
    }
}

async fn status_to_error(response: reqwest::Response) -> BrowzerError {
    let status = response.status();
    let text = response.text().await.unwrap_or_else(|_| "<response unavailable>".to_string());
    match status.as_u16() {
        401 | 403 => BrowzerError::Authentication(text),
        429 => BrowzerError::RateLimit(text),
        400 | 404 | 422 => BrowzerError::InvalidRequest(text),
        _ => BrowzerError::Network(format!("anthropic returned {status}: {text}")),
    }
}

async fn parse_response(response: reqwest::Response) -> BrowzerResult<ClaudeResponse> {
    if !response.status().is_success() {
        return Err(status_to_error(response).await);
    }
    response
        .json::<ClaudeResponse>()
        .await
        .map_err(|err| BrowzerError::InvalidRequest(format!("anthropic response invalid: {err}")))
}

#[derive(Debug, Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    system: String,
    messages: Vec<ClaudeMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ClaudeTool>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct ClaudeTool {
    name: String,
    description: String,
    input_schema: JsonValue,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
    role: String,
    content: Vec<ClaudeContentBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClaudeContentBlock {
    Text { text: String },
    Image { source: ClaudeImageSource },
}

#[derive(Debug, Serialize)]
struct ClaudeImageSource {
    r#type: String,
    media_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    id: String,
    #[serde(default)]
    model: Option<String>,
    content: Vec<ClaudeResponseBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<ClaudeUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClaudeResponseBlock {
    Text { text: String },
    ToolUse { id: String, name: String, input: JsonValue },
}

#[derive(Debug, Deserialize)]
struct ClaudeUsage {
    #[serde(rename = "input_tokens", default)]
    input_tokens: u32,
    #[serde(rename = "output_tokens", default)]
    output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_api_key() {
        let err = AnthropicAdapter::new(AnthropicConfig::default()).unwrap_err();
        assert!(matches!(err, BrowzerError::Authentication(_)));
    }

    #[test]
    fn maps_tool_use_stop_reason() {
        assert_eq!(map_stop_reason("tool_use"), FinishReason::ToolCalls);
        assert_eq!(map_stop_reason("max_tokens"), FinishReason::Length);
        assert_eq!(map_stop_reason("end_turn"), FinishReason::Stop);
    }

    #[test]
    fn converts_tool_use_blocks_into_unified_tool_calls() {
        let response = ClaudeResponse {
            id: "msg_1".to_string(),
            model: Some("claude-sonnet-4-5".to_string()),
            content: vec![
                ClaudeResponseBlock::Text { text: "Looking...".to_string() },
                ClaudeResponseBlock::ToolUse {
                    id: "call_1".to_string(),
                    name: "click_element".to_string(),
                    input: json!({"selector_value": "#go"}),
                },
            ],
            stop_reason: Some("tool_use".to_string()),
            usage: Some(ClaudeUsage { input_tokens: 10, output_tokens: 5 }),
        };
        let unified = into_unified(response, "claude-sonnet-4-5");
        assert_eq!(unified.finish_reason, FinishReason::ToolCalls);
        assert_eq!(unified.message.tool_calls.len(), 1);
        assert_eq!(unified.message.tool_calls[0].function.name, "click_element");
        assert_eq!(unified.usage.unwrap().total, 15);
    }
}
