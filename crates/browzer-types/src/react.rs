//! Agent reasoning artifacts and the per-session Execution Context (§3, §4.9).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::browser::BrowserContext;
use crate::ids::{IterationId, SessionId, TabId, ThoughtId};
use crate::llm::{Message, ToolCall, ToolResult};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AgentThought {
    pub id: ThoughtId,
    pub reasoning: String,
    pub timestamp: DateTime<Utc>,
}

impl AgentThought {
    pub fn new(reasoning: impl Into<String>) -> Self {
        Self {
            id: ThoughtId::new(),
            reasoning: reasoning.into(),
            timestamp: Utc::now(),
        }
    }
}

/// `Action.type ∈ {tool_call, ask_user, complete_task, retry, abort}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentAction {
    ToolCall { call: ToolCall },
    AskUser { question: String },
    CompleteTask { response: String },
    Retry { reason: String },
    Abort { reason: String },
}

impl AgentAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ToolCall { .. } => "tool_call",
            Self::AskUser { .. } => "ask_user",
            Self::CompleteTask { .. } => "complete_task",
            Self::Retry { .. } => "retry",
            Self::Abort { .. } => "abort",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AgentObservation {
    pub summary: String,
    pub timestamp: DateTime<Utc>,
}

impl AgentObservation {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            timestamp: Utc::now(),
        }
    }
}

/// `{iteration, observation, browserContext, thought, reasoning, action,
/// actionResult?, tokensUsed, ts}` (§3).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReactIteration {
    pub id: IterationId,
    pub iteration: u32,
    pub observation: AgentObservation,
    pub browser_context: Option<BrowserContext>,
    pub thought: AgentThought,
    pub action: AgentAction,
    pub action_result: Option<ToolResult>,
    pub tokens_used: u32,
    pub ts: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    Idle,
    Thinking,
    Planning,
    Executing,
    Observing,
    Waiting,
    Completed,
    Failed,
    Paused,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    Autonomous,
    SemiSupervised,
    Supervised,
}

impl Default for ExecutionMode {
    fn default() -> Self {
        Self::Autonomous
    }
}

/// Per-session mutable state driving the ReAct engine (§3 `Execution Context`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub session_id: SessionId,
    pub tab_id: TabId,
    pub state: ExecutionState,
    pub mode: ExecutionMode,
    pub current_goal: Option<String>,
    pub messages: Vec<Message>,
    pub executed_steps: Vec<ReactIterationSummary>,
    pub start_time: DateTime<Utc>,
    pub last_update_time: DateTime<Utc>,
    pub execution_count: u32,
    pub max_execution_steps: u32,
    pub max_thinking_time_secs: u64,
    pub requires_user_approval: bool,
    pub browser_context: Option<BrowserContext>,
}

/// Lightweight record kept in `executedSteps`; the full `ReactIteration`
/// (with its browser-context snapshot) lives in the orchestrator's trace.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReactIterationSummary {
    pub iteration: u32,
    pub action_label: String,
    pub success: bool,
}

impl ExecutionContext {
    pub fn new(session_id: SessionId, tab_id: TabId) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            tab_id,
            state: ExecutionState::Idle,
            mode: ExecutionMode::Autonomous,
            current_goal: None,
            messages: Vec::new(),
            executed_steps: Vec::new(),
            start_time: now,
            last_update_time: now,
            execution_count: 0,
            max_execution_steps: 20,
            max_thinking_time_secs: 300,
            requires_user_approval: false,
            browser_context: None,
        }
    }

    pub fn touch(&mut self) {
        self.last_update_time = Utc::now();
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, ExecutionState::Completed | ExecutionState::Failed)
    }

    pub fn record_step(&mut self, summary: ReactIterationSummary) {
        self.executed_steps.push(summary);
        self.execution_count += 1;
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_context_starts_idle() {
        let ctx = ExecutionContext::new(SessionId::new(), TabId::new());
        assert_eq!(ctx.state, ExecutionState::Idle);
        assert_eq!(ctx.max_execution_steps, 20);
        assert!(!ctx.is_terminal());
    }

    #[test]
    fn action_label_matches_variant() {
        assert_eq!(
            AgentAction::CompleteTask {
                response: "done".into()
            }
            .label(),
            "complete_task"
        );
    }
}
