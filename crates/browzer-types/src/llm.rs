//! Message and LLM wire-contract types (§3, §4.6).

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A single content part within a message: text or an image.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    Image { url: String },
}

/// `content: string | [text|image]*` — either a plain string or a list of
/// typed parts, matching the shape LLM providers accept for multimodal
/// messages.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::Image { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    pub fn char_len(&self) -> usize {
        match self {
            Self::Text(s) => s.chars().count(),
            Self::Parts(parts) => parts
                .iter()
                .map(|p| match p {
                    ContentPart::Text { text } => text.chars().count(),
                    // Images are accounted for separately in token estimation
                    // (~1000 tokens flat); contribute nothing to char length.
                    ContentPart::Image { .. } => 0,
                })
                .sum(),
        }
    }

    pub fn image_count(&self) -> usize {
        match self {
            Self::Text(_) => 0,
            Self::Parts(parts) => parts
                .iter()
                .filter(|p| matches!(p, ContentPart::Image { .. }))
                .count(),
        }
    }
}

/// `{role, content, toolCalls?, toolCallId?, name?}` (§3 `Message`).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: MessageContent,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(Role::Assistant, content)
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: MessageContent::Text(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
            name: None,
        }
    }

    fn plain(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::Text(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self.role, Role::System)
    }
}

/// `ToolCall = {id, function:{name, arguments:JSONString}}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub function: ToolCallFunction,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolCallFunction {
    pub name: String,
    /// JSON-encoded argument object, as returned by the LLM provider.
    pub arguments: String,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            function: ToolCallFunction {
                name: name.into(),
                arguments: arguments.to_string(),
            },
        }
    }

    pub fn parsed_arguments(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.function.arguments)
    }
}

/// `ToolResult = {success, data?, message?, error?}`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn ok(data: impl Into<Option<serde_json::Value>>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: data.into(),
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            data: None,
            message: Some(message.clone()),
            error: Some(message),
        }
    }
}

/// Tool schema in JSON-function-calling shape, as forwarded to providers.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Unified request `{messages[], tools?, model?, maxTokens?, temperature?,
/// topP?, stream?, systemPrompt?, stopSequences?}` (§4.6).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmRequest {
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default)]
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
}

impl LlmRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
            model: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            stream: false,
            system_prompt: None,
            stop_sequences: Vec::new(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolSchema>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
    Error,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    pub input: u32,
    pub output: u32,
    pub total: u32,
}

impl TokenUsage {
    pub fn new(input: u32, output: u32) -> Self {
        Self {
            input,
            output,
            total: input + output,
        }
    }
}

/// Unified response `{id, model, provider, message, usage?, finishReason}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmResponse {
    pub id: String,
    pub model: String,
    pub provider: String,
    pub message: Message,
    pub usage: Option<TokenUsage>,
    pub finish_reason: FinishReason,
}

/// Stream chunk kinds (§4.6): `type ∈ {text_delta, tool_call_delta,
/// tool_call_complete, message_start, message_complete, error}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamChunk {
    MessageStart,
    TextDelta { text: String },
    ToolCallDelta { index: usize, delta: String },
    ToolCallComplete { tool_call: ToolCall },
    MessageComplete { response: LlmResponse },
    Error { message: String },
}

/// Capability descriptor returned by `getCapabilities` (§9).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderCapabilities {
    pub supports_tools: bool,
    pub supports_vision: bool,
    pub supports_streaming: bool,
    pub max_context_tokens: u32,
}

/// Per-model cost rates in $/1M tokens, used for cost accounting.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ModelRates {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl ModelRates {
    pub fn cost(&self, usage: TokenUsage) -> f64 {
        let input_cost = (usage.input as f64 / 1_000_000.0) * self.input_per_million;
        let output_cost = (usage.output as f64 / 1_000_000.0) * self.output_per_million;
        input_cost + output_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_call_round_trips_arguments() {
        let call = ToolCall::new("1", "navigate_to_url", serde_json::json!({"url": "https://x"}));
        let parsed = call.parsed_arguments().unwrap();
        assert_eq!(parsed["url"], "https://x");
    }

    #[test]
    fn token_usage_totals() {
        let usage = TokenUsage::new(100, 50);
        assert_eq!(usage.total, 150);
    }

    #[test]
    fn model_rates_cost_computation() {
        let rates = ModelRates {
            input_per_million: 3.0,
            output_per_million: 15.0,
        };
        let usage = TokenUsage::new(1_000_000, 1_000_000);
        assert_eq!(rates.cost(usage), 18.0);
    }

    #[test]
    fn message_content_char_len_ignores_images() {
        let content = MessageContent::Parts(vec![
            ContentPart::Text { text: "hi".into() },
            ContentPart::Image { url: "data:...".into() },
        ]);
        assert_eq!(content.char_len(), 2);
        assert_eq!(content.image_count(), 1);
    }
}
