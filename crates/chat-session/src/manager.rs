//! `ChatSessionManager` (§4.8): a DashMap-keyed store of append-only
//! sessions, indexed both by tab (for "get or create a chat session for
//! tabId") and by session id, following the donor kernel's DashMap-of-state
//! pattern generalized from bounded diagnostic rings to an unbounded
//! append-only message log.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use browzer_types::{ChatSession, ChatSessionStats, ChatTurn, Message, Role, SessionId, TabId, ToolCall, ToolResult};

use crate::persistence::{NoopPersistence, SessionPersistence};

pub struct ChatSessionManager {
    by_tab: DashMap<String, String>,
    by_session: DashMap<String, Mutex<ChatSession>>,
    persistence: Arc<dyn SessionPersistence>,
}

impl Default for ChatSessionManager {
    fn default() -> Self {
        Self::new(Arc::new(NoopPersistence))
    }
}

impl ChatSessionManager {
    pub fn new(persistence: Arc<dyn SessionPersistence>) -> Self {
        Self {
            by_tab: DashMap::new(),
            by_session: DashMap::new(),
            persistence,
        }
    }

    /// Returns the existing session id for `tab_id`, or creates a fresh
    /// session and registers it under that tab.
    pub fn get_or_create_for_tab(&self, tab_id: &TabId) -> SessionId {
        if let Some(session_id) = self.by_tab.get(&tab_id.0) {
            return SessionId(session_id.clone());
        }
        let session = ChatSession::new(tab_id.clone());
        let session_id = session.id.clone();
        self.by_tab.insert(tab_id.0.clone(), session_id.0.clone());
        self.by_session.insert(session_id.0.clone(), Mutex::new(session));
        session_id
    }

    pub fn get(&self, session_id: &SessionId) -> Option<ChatSession> {
        self.by_session.get(&session_id.0).map(|s| s.lock().clone())
    }

    pub fn stats(&self, session_id: &SessionId) -> Option<ChatSessionStats> {
        self.by_session.get(&session_id.0).map(|s| s.lock().stats.clone())
    }

    /// Appends a user message; if this is the session's first message, also
    /// derives the session title from it.
    pub fn append_user_message(&self, session_id: &SessionId, content: impl Into<String>) {
        self.mutate(session_id, |session| {
            let content = content.into();
            if session.messages.is_empty() {
                session.title = Some(ChatSession::generate_title(&content));
            }
            session.messages.push(Message::user(content));
            session.stats.total_messages += 1;
        });
    }

    /// Appends a plain reference/system-style user message without
    /// affecting the derived title (used for recording-context prefixes).
    pub fn append_context_message(&self, session_id: &SessionId, content: impl Into<String>) {
        self.mutate(session_id, |session| {
            session.messages.push(Message::user(content));
            session.stats.total_messages += 1;
        });
    }

    pub fn append_assistant_message(
        &self,
        session_id: &SessionId,
        content: impl Into<String>,
        tool_calls: Vec<ToolCall>,
    ) {
        self.mutate(session_id, |session| {
            let mut message = Message::assistant(content);
            session.stats.total_tool_calls += tool_calls.len() as u32;
            message.tool_calls = tool_calls;
            session.messages.push(message);
            session.stats.total_messages += 1;
        });
    }

    /// Appends a tool result with role `tool` and `toolCallId` (§4.8), and
    /// updates the success/failure tallies.
    pub fn append_tool_result(&self, session_id: &SessionId, tool_call_id: impl Into<String>, result: &ToolResult) {
        let tool_call_id = tool_call_id.into();
        let body = serde_json::to_string(result).unwrap_or_else(|_| "{}".to_string());
        self.mutate(session_id, |session| {
            session.messages.push(Message::tool_result(tool_call_id, body));
            session.stats.total_messages += 1;
            if result.success {
                session.stats.successful_actions += 1;
            } else {
                session.stats.failed_actions += 1;
            }
        });
    }

    pub fn record_turn(&self, session_id: &SessionId, turn: ChatTurn) {
        self.mutate(session_id, |session| {
            session.stats.total_tokens_used += turn.tokens_used as u64;
            session.stats.total_cost += turn.cost;
            session.turns.push(turn);
        });
    }

    pub fn exists(&self, session_id: &SessionId) -> bool {
        self.by_session.contains_key(&session_id.0)
    }

    fn mutate<F>(&self, session_id: &SessionId, update: F)
    where
        F: FnOnce(&mut ChatSession),
    {
        let Some(entry) = self.by_session.get(&session_id.0) else {
            debug!(session_id = %session_id, "chat session not found for mutation");
            return;
        };
        let mut session = entry.lock();
        update(&mut session);
        session.last_message_at = chrono::Utc::now();
        self.persistence.persist(&session);
    }
}

/// Builds a reference-workflow user message summarizing up to 20 prior
/// recorded actions, as delegated by the orchestrator (§4.10 step 3).
pub fn recording_context_message(actions: &[browzer_types::RecordedAction]) -> String {
    let mut lines = vec![
        "Reference workflow from a prior recording (the page may have changed since):".to_string(),
    ];
    for action in actions.iter().take(20) {
        let target = action
            .target
            .as_ref()
            .and_then(|t| t.text.clone().or_else(|| t.aria_label.clone()).or_else(|| t.selector.clone()))
            .unwrap_or_else(|| "<unknown>".to_string());
        match &action.value {
            Some(value) => lines.push(format!("- {:?} \"{}\" value=\"{}\"", action.action_type, target, value)),
            None => lines.push(format!("- {:?} \"{}\"", action.action_type, target)),
        }
    }
    lines.join("\n")
}

#[allow(dead_code)]
fn assert_role_is_tool(message: &Message) -> bool {
    matches!(message.role, Role::Tool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use browzer_types::ToolResult;

    #[tokio::test]
    async fn get_or_create_reuses_same_session_per_tab() {
        let manager = ChatSessionManager::default();
        let tab = TabId::new();
        let first = manager.get_or_create_for_tab(&tab);
        let second = manager.get_or_create_for_tab(&tab);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn first_user_message_sets_title() {
        let manager = ChatSessionManager::default();
        let tab = TabId::new();
        let session_id = manager.get_or_create_for_tab(&tab);
        manager.append_user_message(&session_id, "open example.com and click login");
        let session = manager.get(&session_id).unwrap();
        assert_eq!(session.title.as_deref(), Some("open example.com and click login"));
        assert_eq!(session.stats.total_messages, 1);
    }

    #[tokio::test]
    async fn tool_result_updates_success_and_failure_counts() {
        let manager = ChatSessionManager::default();
        let tab = TabId::new();
        let session_id = manager.get_or_create_for_tab(&tab);
        manager.append_tool_result(&session_id, "call_1", &ToolResult::ok(None, "clicked"));
        manager.append_tool_result(&session_id, "call_2", &ToolResult::failure("not found"));
        let stats = manager.stats(&session_id).unwrap();
        assert_eq!(stats.successful_actions, 1);
        assert_eq!(stats.failed_actions, 1);

        let session = manager.get(&session_id).unwrap();
        assert!(matches!(session.messages[0].role, Role::Tool));
        assert_eq!(session.messages[0].tool_call_id.as_deref(), Some("call_1"));
    }

    #[tokio::test]
    async fn last_message_at_advances_on_mutation() {
        let manager = ChatSessionManager::default();
        let tab = TabId::new();
        let session_id = manager.get_or_create_for_tab(&tab);
        let created = manager.get(&session_id).unwrap().last_message_at;
        manager.append_user_message(&session_id, "hi");
        let updated = manager.get(&session_id).unwrap().last_message_at;
        assert!(updated >= created);
    }
}
