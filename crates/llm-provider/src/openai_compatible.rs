//! OpenAI-compatible chat-completions adapter, grounded on the donor
//! kernel's `llm/openai.rs` (multi-key rotation on HTTP 429, bearer auth,
//! JSON parsing) generalized to the unified §4.6 contract. Also used to
//! serve Gemini, since spec.md only requires "≥2 providers" behind a
//! uniform contract rather than a bespoke wire format per vendor — Gemini's
//! `/v1beta/openai/` compatibility endpoint speaks this same shape (see
//! DESIGN.md's Open Question resolution).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::warn;

use browzer_types::{
    BrowzerError, BrowzerResult, FinishReason, LlmRequest, LlmResponse, Message, MessageContent,
    ModelRates, ProviderCapabilities, Role, StreamChunk, TokenUsage, ToolCall, ToolCallFunction,
    ToolSchema,
};

use crate::provider::{LlmProviderAdapter, StreamSink};
use crate::retry::{self, RetryPolicy};
use crate::stats::{ProviderStats, ProviderStatsSnapshot};

#[derive(Clone, Debug)]
pub struct OpenAiCompatibleConfig {
    pub provider_name: String,
    pub api_keys: Vec<String>,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
    pub retry_policy: RetryPolicy,
    pub rates: ModelRates,
    pub supports_vision: bool,
    pub max_context_tokens: u32,
}

impl OpenAiCompatibleConfig {
    pub fn openai(api_keys: Vec<String>, model: impl Into<String>) -> Self {
        Self {
            provider_name: "openai".to_string(),
            api_keys,
            model: model.into(),
            api_base: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(60),
            retry_policy: RetryPolicy::default(),
            rates: ModelRates { input_per_million: 2.5, output_per_million: 10.0 },
            supports_vision: true,
            max_context_tokens: 128_000,
        }
    }

    pub fn gemini(api_keys: Vec<String>, model: impl Into<String>) -> Self {
        Self {
            provider_name: "gemini".to_string(),
            api_keys,
            model: model.into(),
            api_base: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            timeout: Duration::from_secs(60),
            retry_policy: RetryPolicy::default(),
            rates: ModelRates { input_per_million: 1.25, output_per_million: 5.0 },
            supports_vision: true,
            max_context_tokens: 1_000_000,
        }
    }
}

pub struct OpenAiCompatibleAdapter {
    client: reqwest::Client,
    config: OpenAiCompatibleConfig,
    stats: ProviderStats,
}

impl OpenAiCompatibleAdapter {
    pub fn new(config: OpenAiCompatibleConfig) -> BrowzerResult<Self> {
        if config.api_keys.is_empty() {
            return Err(BrowzerError::Authentication(format!(
                "missing API key for {}",
                config.provider_name
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| BrowzerError::internal(format!("failed to build HTTP client: {err}")))?;
        Ok(Self { client, config, stats: ProviderStats::new() })
    }

    fn build_body(&self, request: &LlmRequest, stream: bool) -> ChatCompletionRequest {
        let mut messages = Vec::new();
        if let Some(system) = &request.system_prompt {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: Some(system.clone()),
                tool_calls: None,
                tool_call_id: None,
            });
        }
        for message in &request.messages {
            messages.push(to_chat_message(message));
        }
        ChatCompletionRequest {
            model: request.model.clone().unwrap_or_else(|| self.config.model.clone()),
            messages,
            tools: to_chat_tools(&request.tools),
            temperature: request.temperature,
            top_p: request.top_p,
            max_tokens: request.max_tokens,
            stream,
            stop: if request.stop_sequences.is_empty() { None } else { Some(request.stop_sequences.clone()) },
        }
    }

    /// Rotates across configured API keys on a 429, mirroring the donor's
    /// key-rotation loop; stops at the first non-rate-limit failure.
    async fn send_once(&self, request: &LlmRequest) -> BrowzerResult<ChatCompletionResponse> {
        let url = format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'));
        let body = self.build_body(request, false);
        let mut last_error = None;

        for (index, key) in self.config.api_keys.iter().enumerate() {
            let response = self
                .client
                .post(&url)
                .bearer_auth(key)
                .json(&body)
                .send()
                .await;
            let response = match response {
                Ok(resp) => resp,
                Err(err) => {
                    last_error = Some(classify_transport_error(err));
                    continue;
                }
            };

            if !response.status().is_success() {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                if status.as_u16() == 429 && index + 1 < self.config.api_keys.len() {
                    warn!(
                        provider = %self.config.provider_name,
                        attempt = index + 1,
                        remaining = self.config.api_keys.len() - index - 1,
                        "rate limited, rotating API key"
                    );
                    last_error = Some(BrowzerError::RateLimit(text));
                    continue;
                }
                return Err(status_to_error(status.as_u16(), text));
            }

            return response
                .json::<ChatCompletionResponse>()
                .await
                .map_err(|err| BrowzerError::InvalidRequest(format!("response invalid: {err}")));
        }

        Err(last_error.unwrap_or_else(|| {
            BrowzerError::RateLimit(format!("{} request exhausted all API keys", self.config.provider_name))
        }))
    }
}

#[async_trait]
impl LlmProviderAdapter for OpenAiCompatibleAdapter {
    fn name(&self) -> &str {
        &self.config.provider_name
    }

    async fn generate_completion(&self, request: &LlmRequest) -> BrowzerResult<LlmResponse> {
        let started = Instant::now();
        let result = retry::with_retries(self.config.retry_policy, || self.send_once(request)).await;
        let latency_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(response) => {
                let unified = into_unified(response, &self.config);
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

        let url = format!("{}/chat/completions", self.config.api_base.trim_end_matches('/'));
        let body = self.build_body(request, true);
        let key = self.config.api_keys.first().cloned().unwrap_or_default();
        let response = self
            .client
            .post(&url)
            .bearer_auth(&key)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            let err = status_to_error(status, text);
            let latency_ms = started.elapsed().as_millis() as u64;
            self.stats.record_failure(retry::error_code(&err), latency_ms);
            on_chunk(StreamChunk::Error { message: err.to_string() });
            return Err(err);
        }

        let mut text = String::new();
        let mut usage = TokenUsage::default();
        let mut finish_reason = FinishReason::Stop;
        let mut byte_stream = response.bytes_stream();
        let mut buffer = String::new();

        while let Some(chunk) = byte_stream.next().await {
            let bytes = chunk.map_err(|err| BrowzerError::Stream(err.to_string()))?;
            buffer.push_str(&String::from_utf8_lossy(&bytes));
            while let Some(pos) = buffer.find('\n') {
                let line = buffer[..pos].to_string();
                buffer.drain(..pos + 1);
                let line = line.trim();
                let Some(data) = line.strip_prefix("data:") else { continue };
                let data = data.trim();
                if data == "[DONE]" {
                    continue;
                }
                if let Ok(value) = serde_json::from_str::<JsonValue>(data) {
                    if let Some(delta) = value["choices"][0]["delta"]["content"].as_str() {
                        text.push_str(delta);
                        on_chunk(StreamChunk::TextDelta { text: delta.to_string() });
                    }
                    if let Some(reason) = value["choices"][0]["finish_reason"].as_str() {
                        finish_reason = map_finish_reason(reason);
                    }
                    if let Some(prompt_tokens) = value["usage"]["prompt_tokens"].as_u64() {
                        usage.input = prompt_tokens as u32;
                    }
                    if let Some(completion_tokens) = value["usage"]["completion_tokens"].as_u64() {
                        usage.output = completion_tokens as u32;
                    }
                }
            }
        }
        usage.total = usage.input + usage.output;

        let response = LlmResponse {
            id: format!("{}-stream-{}", self.config.provider_name, chrono::Utc::now().timestamp_millis()),
            model: self.config.model.clone(),
            provider: self.config.provider_name.clone(),
            message: Message::assistant(text),
            usage: Some(usage),
            finish_reason,
        };
        let latency_ms = started.elapsed().as_millis() as u64;
        self.stats.record_success(usage, self.config.rates.cost(usage), latency_ms);
        on_chunk(StreamChunk::MessageComplete { response: response.clone() });
        Ok(response)
    }

    fn get_capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_tools: true,
            supports_vision: self.config.supports_vision,
            supports_streaming: true,
            max_context_tokens: self.config.max_context_tokens,
        }
    }

    fn list_models(&self) -> Vec<String> {
        vec![self.config.model.clone()]
    }

    fn stats(&self) -> ProviderStatsSnapshot {
        self.stats.snapshot()
    }
}

fn to_chat_message(message: &Message) -> ChatMessage {
    let role = match message.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };
    let tool_calls = if message.tool_calls.is_empty() {
        None
    } else {
        Some(
            message
                .tool_calls
                .iter()
                .map(|tc| ChatToolCall {
                    id: tc.id.clone(),
                    r#type: "function".to_string(),
                    function: ChatToolCallFunction {
                        name: tc.function.name.clone(),
                        arguments: tc.function.arguments.clone(),
                    },
                })
                .collect(),
        )
    };
    ChatMessage {
        role: role.to_string(),
        content: Some(message.content.as_text()),
        tool_calls,
        tool_call_id: message.tool_call_id.clone(),
    }
}

fn to_chat_tools(tools: &[ToolSchema]) -> Option<Vec<ChatTool>> {
    if tools.is_empty() {
        return None;
    }
    Some(
        tools
            .iter()
            .map(|t| ChatTool {
                r#type: "function".to_string(),
                function: ChatToolFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                },
            })
            .collect(),
    )
}

fn into_unified(response: ChatCompletionResponse, config: &OpenAiCompatibleConfig) -> LlmResponse {
    let choice = response.choices.into_iter().next();
    let (content, tool_calls, finish_reason) = match choice {
        Some(choice) => {
            let content = choice.message.content.unwrap_or_default();
            let tool_calls = choice
                .message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(|tc| ToolCall {
                    id: tc.id,
                    function: ToolCallFunction {
                        name: tc.function.name,
                        arguments: tc.function.arguments,
                    },
                })
                .collect::<Vec<_>>();
            let finish_reason = map_finish_reason(&choice.finish_reason);
            (content, tool_calls, finish_reason)
        }
        None => (String::new(), Vec::new(), FinishReason::Error),
    };
    let message = Message {
        role: Role::Assistant,
        content: MessageContent::Text(content),
        tool_calls,
        tool_call_id: None,
        name: None,
    };
    let usage = response
        .usage
        .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens));
    LlmResponse {
        id: response.id,
        model: response.model.unwrap_or_else(|| config.model.clone()),
        provider: config.provider_name.clone(),
        message,
        usage,
        finish_reason,
    }
}

fn map_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "length" => FinishReason::Length,
        "tool_calls" => FinishReason::ToolCalls,
        "content_filter" => FinishReason::ContentFilter,
        "stop" => FinishReason::Stop,
        _ => FinishReason::Stop,
    }
}

fn classify_transport_error(err: reqwest::Error) -> BrowzerError {
    if err.is_timeout() {
        BrowzerError::timeout("llm request", 0)
    } else {
        BrowzerError::Network(err.to_string())
    }
}

fn status_to_error(status: u16, text: String) -> BrowzerError {
    match status {
        401 | 403 => BrowzerError::Authentication(text),
        429 => BrowzerError::RateLimit(text),
        400 | 404 | 422 => BrowzerError::InvalidRequest(text),
        _ => BrowzerError::Network(format!("provider returned {status}: {text}")),
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ChatTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct ChatTool {
    r#type: String,
    function: ChatToolFunction,
}

#[derive(Debug, Serialize)]
struct ChatToolFunction {
    name: String,
    description: String,
    parameters: JsonValue,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ChatToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatToolCall {
    id: String,
    r#type: String,
    function: ChatToolCallFunction,
}

#[derive(Debug, Serialize)]
struct ChatToolCallFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    id: String,
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatCompletionChoice>,
    #[serde(default)]
    usage: Option<ChatCompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
    #[serde(default)]
    finish_reason: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ChatCompletionToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionToolCall {
    id: String,
    function: ChatCompletionToolCallFunction,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionToolCallFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_key_list() {
        let err = OpenAiCompatibleAdapter::new(OpenAiCompatibleConfig::openai(vec![], "gpt-4o")).unwrap_err();
        assert!(matches!(err, BrowzerError::Authentication(_)));
    }

    #[test]
    fn gemini_preset_points_at_compat_endpoint() {
        let config = OpenAiCompatibleConfig::gemini(vec!["key".into()], "gemini-2.0-flash");
        assert!(config.api_base.contains("generativelanguage.googleapis.com"));
        assert_eq!(config.provider_name, "gemini");
    }

    #[test]
    fn converts_tool_calls_into_unified_shape() {
        let response = ChatCompletionResponse {
            id: "chatcmpl-1".to_string(),
            model: Some("gpt-4o".to_string()),
            choices: vec![ChatCompletionChoice {
                message: ChatCompletionMessage {
                    content: Some(String::new()),
                    tool_calls: Some(vec![ChatCompletionToolCall {
                        id: "call_1".to_string(),
                        function: ChatCompletionToolCallFunction {
                            name: "navigate_to_url".to_string(),
                            arguments: "{\"url\":\"https://example.com\"}".to_string(),
                        },
                    }]),
                },
                finish_reason: "tool_calls".to_string(),
            }],
            usage: Some(ChatCompletionUsage { prompt_tokens: 20, completion_tokens: 8 }),
        };
        let config = OpenAiCompatibleConfig::openai(vec!["k".into()], "gpt-4o");
        let unified = into_unified(response, &config);
        assert_eq!(unified.finish_reason, FinishReason::ToolCalls);
        assert_eq!(unified.message.tool_calls[0].function.name, "navigate_to_url");
        assert_eq!(unified.usage.unwrap().total, 28);
    }
}
