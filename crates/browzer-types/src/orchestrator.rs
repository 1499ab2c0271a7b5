//! Orchestrator-level types: configuration, the public result shape, and
//! the event-stream payload (§4.10, §6).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::SessionId;
use crate::react::{AgentAction, AgentObservation, AgentThought, ExecutionMode, ExecutionState};

/// `{model, fallbackModel?, mode, maxExecutionSteps, maxThinkingTime,
/// temperature, maxContextTokens, contextCompressionEnabled, maxRetries,
/// retryDelay, dangerousActionsRequireApproval[], allowedDomains?,
/// enableReflection, enablePlanning, enableMemory, streamingEnabled}` (§4.10).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentConfig {
    pub model: String,
    pub fallback_model: Option<String>,
    pub mode: ExecutionMode,
    pub max_execution_steps: u32,
    pub max_thinking_time_secs: u64,
    pub temperature: f32,
    pub max_context_tokens: u32,
    pub context_compression_enabled: bool,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub dangerous_actions_require_approval: Vec<String>,
    pub allowed_domains: Option<Vec<String>>,
    pub enable_reflection: bool,
    pub enable_planning: bool,
    pub enable_memory: bool,
    pub streaming_enabled: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet".to_string(),
            fallback_model: None,
            mode: ExecutionMode::Autonomous,
            max_execution_steps: 20,
            max_thinking_time_secs: 300,
            temperature: 0.2,
            max_context_tokens: 100_000,
            context_compression_enabled: true,
            max_retries: 3,
            retry_delay_ms: 500,
            dangerous_actions_require_approval: Vec::new(),
            allowed_domains: None,
            enable_reflection: true,
            enable_planning: false,
            enable_memory: true,
            streaming_enabled: false,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    pub execution_time_ms: u64,
    pub steps_executed: u32,
    pub tokens_used: u32,
    pub cost: f64,
}

/// `AgentExecutionResult{success, finalState, response, thoughts[],
/// actions[], observations[], metadata, error?}` — the return value of
/// `executeTask` (§4.10).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentExecutionResult {
    pub success: bool,
    pub final_state: ExecutionState,
    pub response: String,
    pub thoughts: Vec<AgentThought>,
    pub actions: Vec<AgentAction>,
    pub observations: Vec<AgentObservation>,
    pub metadata: ExecutionMetadata,
    pub error: Option<String>,
}

/// Event-stream payload types (§6): `state_change, thought, action,
/// observation, plan_update, error, complete`, each carrying
/// `{type, timestamp, sessionId, data}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEventData {
    StateChange { from: ExecutionState, to: ExecutionState },
    Thought { thought: AgentThought },
    Action { action: AgentAction },
    Observation { observation: AgentObservation },
    PlanUpdate { summary: String },
    Error { message: String },
    Complete { result: AgentExecutionResult },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentEvent {
    pub timestamp: DateTime<Utc>,
    pub session_id: SessionId,
    pub data: AgentEventData,
}

impl AgentEvent {
    pub fn new(session_id: SessionId, data: AgentEventData) -> Self {
        Self {
            timestamp: Utc::now(),
            session_id,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_spec_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.max_execution_steps, 20);
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
    }
}
