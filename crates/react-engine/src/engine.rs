//! The ReAct engine (§4.9): bounded Observe-Think-Act-Reflect-Record loop,
//! grounded on the donor kernel's `AgentLoopController` (its `LoopState` /
//! `check_termination` / per-step recording shape) but driven by the real
//! Tool Registry, LLM adapter and Browser Context Provider instead of
//! caller-supplied callbacks, and implementing the exact per-iteration
//! algorithm and failure conditions the spec describes rather than a
//! generic `browser-use`-style step loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::json;
use tracing::info;

use browzer_types::{
    AgentAction, AgentEvent, AgentEventData, AgentObservation, AgentThought, ContextOptions,
    ExecutionContext, ExecutionState, LlmRequest, Message, ReactIterationSummary, ToolResult,
};
use browzer_event_bus::EventBus;
use browser_context::BrowserContextProvider;
use llm_provider::LlmProviderAdapter;
use tool_registry::ToolRegistry;

use crate::completion::classify_completion;
use crate::observation::summarize_observation;
use crate::prompt::build_system_prompt;

const CONSECUTIVE_FAILURE_LIMIT: u32 = 3;
const ITERATION_THROW_GRACE: u32 = 3;
const PAUSE_POLL_MS: u64 = 50;

/// Orchestrator-owned cancellation/pause flags for one in-flight execution
/// (§4.10 lifecycle ops, §5 "Cancellation"). `run_cancellable` checks these
/// at the top of every iteration and, for pause, between await points — an
/// in-flight LLM/tool call is always allowed to finish before either takes
/// effect.
#[derive(Default)]
pub struct ExecutionControl {
    cancelled: AtomicBool,
    paused: AtomicBool,
}

impl ExecutionControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::Relaxed);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::Relaxed);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ReactEngineConfig {
    pub max_iterations: u32,
    pub temperature: f32,
    pub enable_reflection: bool,
}

impl Default for ReactEngineConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            temperature: 0.2,
            enable_reflection: true,
        }
    }
}

/// Everything the orchestrator needs to fold back into the chat session and
/// the final `AgentExecutionResult` (§4.10); session/memory bookkeeping is
/// the orchestrator's responsibility, not the engine's.
#[derive(Debug, Default)]
pub struct EngineOutcome {
    pub success: bool,
    pub final_state: ExecutionState,
    pub response: String,
    pub thoughts: Vec<AgentThought>,
    pub actions: Vec<AgentAction>,
    pub observations: Vec<AgentObservation>,
    pub tool_results: Vec<(browzer_types::ToolCall, ToolResult)>,
    pub tokens_used: u32,
    pub steps_executed: u32,
    pub error: Option<String>,
}

pub struct ReactEngine {
    tools: Arc<ToolRegistry>,
    llm: Arc<dyn LlmProviderAdapter>,
    browser: Arc<BrowserContextProvider>,
    events: Arc<dyn EventBus<AgentEvent>>,
    config: ReactEngineConfig,
}

impl ReactEngine {
    pub fn new(
        tools: Arc<ToolRegistry>,
        llm: Arc<dyn LlmProviderAdapter>,
        browser: Arc<BrowserContextProvider>,
        events: Arc<dyn EventBus<AgentEvent>>,
        config: ReactEngineConfig,
    ) -> Self {
        Self { tools, llm, browser, events, config }
    }

    pub async fn run(&self, ctx: &mut ExecutionContext) -> EngineOutcome {
        self.run_cancellable(ctx, &ExecutionControl::new()).await
    }

    /// Same loop as [`Self::run`], but checked against an [`ExecutionControl`]
    /// at the top of every iteration: a cancelled control ends the task as
    /// failed, a paused one blocks the next iteration until resumed or
    /// cancelled.
    pub async fn run_cancellable(&self, ctx: &mut ExecutionContext, control: &ExecutionControl) -> EngineOutcome {
        let mut outcome = EngineOutcome::default();
        let mut consecutive_failures = 0u32;

        for iteration in 1..=self.config.max_iterations {
            if control.is_cancelled() {
                return self.finish_failed(ctx, outcome, "Task cancelled".to_string());
            }
            while control.is_paused() {
                ctx.state = ExecutionState::Paused;
                tokio::time::sleep(std::time::Duration::from_millis(PAUSE_POLL_MS)).await;
                if control.is_cancelled() {
                    return self.finish_failed(ctx, outcome, "Task cancelled".to_string());
                }
            }

            // 1. Observe
            ctx.state = ExecutionState::Observing;
            let options = ContextOptions {
                include_pruned_dom: true,
                include_console_logs: true,
                max_elements: Some(50),
                max_console_entries: Some(10),
                ..Default::default()
            };
            let browser_context = self.browser.get_context(&options).await;
            let summary = summarize_observation(&browser_context);
            let observation = AgentObservation::new(summary.clone());
            self.publish(ctx, AgentEventData::Observation { observation: observation.clone() }).await;
            outcome.observations.push(observation.clone());
            ctx.browser_context = Some(browser_context);

            // 2. Think
            ctx.state = ExecutionState::Thinking;
            if iteration == 1 {
                if let Some(goal) = ctx.current_goal.clone() {
                    ctx.messages.push(Message::user(goal));
                }
            }
            ctx.messages.push(Message::user(summary));

            let system_prompt = build_system_prompt(&self.tools.list_tools(), ctx.mode, ctx.execution_count, ctx.max_execution_steps);
            let request = LlmRequest::new(ctx.messages.clone())
                .with_tools(self.tools.list_tools())
                .with_system_prompt(system_prompt)
                .with_temperature(self.config.temperature);

            let response = match self.llm.generate_completion(&request).await {
                Ok(response) => response,
                Err(err) => {
                    if iteration > ITERATION_THROW_GRACE {
                        return self.finish_failed(ctx, outcome, err.to_string());
                    }
                    info!(iteration, error = %err, "think step failed, retrying within grace period");
                    continue;
                }
            };
            outcome.tokens_used += response.usage.map(|u| u.total).unwrap_or(0);

            let thought = AgentThought::new(response.message.content.as_text());
            self.publish(ctx, AgentEventData::Thought { thought: thought.clone() }).await;
            outcome.thoughts.push(thought);
            ctx.messages.push(response.message.clone());

            // 3. Act
            ctx.state = ExecutionState::Executing;
            if let Some(call) = response.message.tool_calls.first().cloned() {
                let args = call.parsed_arguments().unwrap_or_else(|_| json!({}));
                let result = self.tools.execute_tool(&call.function.name, args).await;

                let action = AgentAction::ToolCall { call: call.clone() };
                self.publish(ctx, AgentEventData::Action { action: action.clone() }).await;
                outcome.actions.push(action.clone());

                let body = serde_json::to_string(&result).unwrap_or_else(|_| "{}".to_string());
                ctx.messages.push(Message::tool_result(call.id.clone(), body));

                if result.success {
                    consecutive_failures = 0;
                } else {
                    consecutive_failures += 1;
                }

                // 4. Reflect
                if self.config.enable_reflection && !result.success {
                    let error_text = result.error.clone().unwrap_or_else(|| "unknown error".to_string());
                    let reflection = AgentThought::new(format!(
                        "The action failed with error {error_text}; I should try a different approach"
                    ));
                    self.publish(ctx, AgentEventData::Thought { thought: reflection.clone() }).await;
                    outcome.thoughts.push(reflection);
                }

                outcome.tool_results.push((call, result.clone()));

                // 5. Record
                ctx.record_step(ReactIterationSummary {
                    iteration,
                    action_label: action.label().to_string(),
                    success: result.success,
                });
            } else {
                let text = response.message.content.as_text();
                if let Some(phrase) = classify_completion(&text) {
                    info!(phrase = %phrase, "completion keyword matched");
                    let action = AgentAction::CompleteTask { response: text.clone() };
                    self.publish(ctx, AgentEventData::Action { action: action.clone() }).await;
                    outcome.actions.push(action.clone());
                    ctx.record_step(ReactIterationSummary {
                        iteration,
                        action_label: action.label().to_string(),
                        success: true,
                    });
                    return self.finish_completed(ctx, outcome, text);
                }

                consecutive_failures += 1;
                let failed = ToolResult::failure("You did not call any tool. You must use one of the available tools to make progress.");
                ctx.messages.push(Message::user(
                    "You must respond with an actual function call to one of the available tools. Prose-only replies are not accepted unless the task is complete or impossible.",
                ));
                ctx.record_step(ReactIterationSummary {
                    iteration,
                    action_label: "no_tool_call".to_string(),
                    success: false,
                });
                outcome.tool_results.push((
                    browzer_types::ToolCall::new(String::new(), "none", json!({})),
                    failed,
                ));
            }

            if consecutive_failures >= CONSECUTIVE_FAILURE_LIMIT {
                return self.finish_failed(ctx, outcome, "Task failed due to repeated errors".to_string());
            }
        }

        self.finish_failed(ctx, outcome, "Task did not complete within iteration limit".to_string())
    }

    fn finish_completed(&self, ctx: &mut ExecutionContext, mut outcome: EngineOutcome, response: String) -> EngineOutcome {
        ctx.state = ExecutionState::Completed;
        outcome.success = true;
        outcome.final_state = ExecutionState::Completed;
        outcome.response = response;
        outcome.steps_executed = ctx.execution_count;
        outcome
    }

    fn finish_failed(&self, ctx: &mut ExecutionContext, mut outcome: EngineOutcome, message: String) -> EngineOutcome {
        ctx.state = ExecutionState::Failed;
        outcome.success = false;
        outcome.final_state = ExecutionState::Failed;
        outcome.response = message.clone();
        outcome.error = Some(message);
        outcome.steps_executed = ctx.execution_count;
        outcome
    }

    async fn publish(&self, ctx: &ExecutionContext, data: AgentEventData) {
        let event = AgentEvent::new(ctx.session_id.clone(), data);
        if let Err(err) = self.events.publish(event).await {
            info!(error = %err, "failed to publish agent event");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use browzer_event_bus::InMemoryBus;
    use browzer_types::{SessionId, TabId};
    use cdp_adapter::{CdpAdapter, CdpConfig, PageId};
    use llm_provider::{mock::MockReply, MockAdapter};
    use tool_registry::ToolRegistry;

    use super::*;

    fn engine_with(llm: MockAdapter) -> ReactEngine {
        let tools = Arc::new(ToolRegistry::with_unimplemented_handler());
        let adapter = Arc::new(CdpAdapter::noop(CdpConfig::default()));
        let browser = Arc::new(BrowserContextProvider::new(adapter, PageId::new()));
        let events = InMemoryBus::<AgentEvent>::new(16);
        ReactEngine::new(tools, Arc::new(llm), browser, events, ReactEngineConfig::default())
    }

    fn fresh_ctx() -> ExecutionContext {
        let mut ctx = ExecutionContext::new(SessionId::new(), TabId::new());
        ctx.current_goal = Some("open https://example.com".to_string());
        ctx
    }

    #[tokio::test]
    async fn completes_on_first_text_only_reply() {
        let engine = engine_with(MockAdapter::immediate_completion("Task complete."));
        let mut ctx = fresh_ctx();
        let outcome = engine.run(&mut ctx).await;
        assert!(outcome.success);
        assert_eq!(outcome.final_state, ExecutionState::Completed);
    }

    #[tokio::test]
    async fn cancelled_control_stops_before_the_next_iteration() {
        let engine = engine_with(MockAdapter::new(vec![
            MockReply::ToolCall { name: "go_back".to_string(), arguments: serde_json::json!({}) },
            MockReply::Text("Task complete.".to_string()),
        ]));
        let mut ctx = fresh_ctx();
        let control = ExecutionControl::new();
        control.cancel();
        let outcome = engine.run_cancellable(&mut ctx, &control).await;
        assert!(!outcome.success);
        assert_eq!(outcome.final_state, ExecutionState::Failed);
        assert_eq!(outcome.error.as_deref(), Some("Task cancelled"));
    }

    #[tokio::test]
    async fn paused_control_resumes_and_completes() {
        let engine = engine_with(MockAdapter::immediate_completion("Task complete."));
        let mut ctx = fresh_ctx();
        let control = Arc::new(ExecutionControl::new());
        control.pause();

        let resumer = control.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(PAUSE_POLL_MS * 2)).await;
            resumer.resume();
        });

        let outcome = engine.run_cancellable(&mut ctx, &control).await;
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn repeated_tool_failures_terminate_the_task() {
        let engine = engine_with(MockAdapter::new(vec![
            MockReply::ToolCall { name: "nonexistent_tool".to_string(), arguments: serde_json::json!({}) },
            MockReply::ToolCall { name: "nonexistent_tool".to_string(), arguments: serde_json::json!({}) },
            MockReply::ToolCall { name: "nonexistent_tool".to_string(), arguments: serde_json::json!({}) },
        ]));
        let mut ctx = fresh_ctx();
        let outcome = engine.run(&mut ctx).await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Task failed due to repeated errors"));
    }
}
