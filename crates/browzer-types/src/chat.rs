//! Chat session data model (§3, §4.8).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::browser::BrowserContext;
use crate::ids::{SessionId, TabId};
use crate::llm::Message;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatSessionStats {
    pub total_messages: u32,
    pub total_tool_calls: u32,
    pub total_tokens_used: u64,
    pub total_cost: f64,
    pub successful_actions: u32,
    pub failed_actions: u32,
}

/// One recorded turn: a user message plus everything the orchestrator
/// produced in response to it, grouped for per-turn bookkeeping.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatTurn {
    pub user_message_index: usize,
    pub assistant_message_index: usize,
    pub tokens_used: u32,
    pub cost: f64,
    pub created_at: DateTime<Utc>,
}

/// `{id, tabId, userId?, title?, createdAt, lastMessageAt, messages[],
/// turns[], currentContext?, stats}` (§3 `Chat Session`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: SessionId,
    pub tab_id: TabId,
    pub user_id: Option<String>,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_message_at: DateTime<Utc>,
    pub messages: Vec<Message>,
    pub turns: Vec<ChatTurn>,
    pub current_context: Option<BrowserContext>,
    pub stats: ChatSessionStats,
}

impl ChatSession {
    pub fn new(tab_id: TabId) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            tab_id,
            user_id: None,
            title: None,
            created_at: now,
            last_message_at: now,
            messages: Vec::new(),
            turns: Vec::new(),
            current_context: None,
            stats: ChatSessionStats::default(),
        }
    }

    /// Synthesizes a short title from the first user message: at most 50
    /// characters, with a trailing ellipsis if truncated (§4.8).
    pub fn generate_title(first_user_message: &str) -> String {
        const MAX_LEN: usize = 50;
        let trimmed = first_user_message.trim();
        let chars: Vec<char> = trimmed.chars().collect();
        if chars.len() <= MAX_LEN {
            trimmed.to_string()
        } else {
            let truncated: String = chars[..MAX_LEN].iter().collect();
            format!("{truncated}…")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_not_truncated_when_short() {
        assert_eq!(ChatSession::generate_title("open example.com"), "open example.com");
    }

    #[test]
    fn title_truncated_with_ellipsis() {
        let long = "a".repeat(80);
        let title = ChatSession::generate_title(&long);
        assert_eq!(title.chars().count(), 51);
        assert!(title.ends_with('…'));
    }

    #[test]
    fn new_session_has_empty_log() {
        let session = ChatSession::new(TabId::new());
        assert!(session.messages.is_empty());
        assert_eq!(session.stats.total_messages, 0);
    }
}
