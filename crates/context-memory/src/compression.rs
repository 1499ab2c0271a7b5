//! The four compression strategies (§4.7) and `optimize_messages`, the
//! entrypoint the orchestrator calls once per turn when context compression
//! is enabled. Each strategy is pure: no I/O, no shared state.

use serde::{Deserialize, Serialize};

use browzer_types::{BrowserContext, Message, Role, ToolSchema};

use crate::tokens::{average_tokens_per_message, estimate_tokens};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompressionStrategy {
    SlidingWindow,
    Compression,
    ImportanceBased,
    Hierarchical,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub optimized_messages: Vec<Message>,
    pub compression_applied: bool,
    pub tokens_saved: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Returns the messages untouched, plus the total-tokens estimate, when no
/// compression is needed — callers can compare `tokens_saved == 0` instead
/// of inspecting `compression_applied` to decide whether to log.
pub fn optimize_messages(
    strategy: CompressionStrategy,
    messages: &[Message],
    system_prompt: Option<&str>,
    browser_context: Option<&BrowserContext>,
    tools: &[ToolSchema],
    target_tokens: u32,
) -> OptimizationResult {
    let current_tokens = estimate_tokens(system_prompt, messages, browser_context, tools);
    if current_tokens <= target_tokens {
        return OptimizationResult {
            optimized_messages: messages.to_vec(),
            compression_applied: false,
            tokens_saved: 0,
            summary: None,
        };
    }

    let (optimized, summary) = match strategy {
        CompressionStrategy::SlidingWindow => (sliding_window(messages, current_tokens, target_tokens), None),
        CompressionStrategy::Compression => compression(messages),
        CompressionStrategy::ImportanceBased => (importance_based(messages, target_tokens), None),
        CompressionStrategy::Hierarchical => hierarchical(messages, target_tokens),
    };

    let optimized_tokens = estimate_tokens(system_prompt, &optimized, browser_context, tools);
    let tokens_saved = current_tokens.saturating_sub(optimized_tokens);
    OptimizationResult {
        optimized_messages: optimized,
        compression_applied: true,
        tokens_saved,
        summary,
    }
}

/// Always keeps system messages, then drops a prefix of non-system
/// messages sized by `ceil((current - target) / averageTokensPerMessage)`.
fn sliding_window(messages: &[Message], current_tokens: u32, target_tokens: u32) -> Vec<Message> {
    let (system, rest): (Vec<Message>, Vec<Message>) =
        messages.iter().cloned().partition(|m| m.is_system());

    let avg = average_tokens_per_message(&rest);
    let deficit = current_tokens.saturating_sub(target_tokens) as f64;
    let drop_count = (deficit / avg).ceil() as usize;
    let drop_count = drop_count.min(rest.len());

    let mut result = system;
    result.extend(rest.into_iter().skip(drop_count));
    result
}

/// Splits non-system messages at the midpoint; the older half becomes a
/// single synthetic summary message, the newer half is kept verbatim.
fn compression(messages: &[Message]) -> (Vec<Message>, Option<String>) {
    let (system, rest): (Vec<Message>, Vec<Message>) =
        messages.iter().cloned().partition(|m| m.is_system());

    if rest.len() < 2 {
        return (messages.to_vec(), None);
    }

    let midpoint = rest.len() / 2;
    let (older, newer) = rest.split_at(midpoint);

    let key_facts = older
        .iter()
        .filter(|m| matches!(m.role, Role::User))
        .map(|m| format!("- {}", truncate(&m.content.as_text(), 120)))
        .collect::<Vec<_>>()
        .join("\n");

    let summary_text = format!("Previous conversation summary: {} earlier messages condensed.\nKey facts:\n{}", older.len(), key_facts);
    let summary_message = Message::system(summary_text.clone());

    let mut result = system;
    result.push(summary_message);
    result.extend(newer.iter().cloned());
    (result, Some(summary_text))
}

/// Scores every message and keeps the highest scorers until the budget is
/// met, then restores original order so the transcript still reads
/// top-to-bottom.
fn importance_based(messages: &[Message], target_tokens: u32) -> Vec<Message> {
    let mut scored: Vec<(usize, f32, &Message)> = messages
        .iter()
        .enumerate()
        .map(|(index, message)| (index, score_message(message, index, messages.len()), message))
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut kept: Vec<(usize, Message)> = Vec::new();
    let mut running_tokens = 0u32;
    for (index, _score, message) in scored {
        let message_tokens = estimate_tokens(None, std::slice::from_ref(message), None, &[]);
        if running_tokens + message_tokens > target_tokens && !kept.is_empty() {
            continue;
        }
        running_tokens += message_tokens;
        kept.push((index, message.clone()));
    }

    kept.sort_by_key(|(index, _)| *index);
    kept.into_iter().map(|(_, message)| message).collect()
}

fn score_message(message: &Message, index: usize, total: usize) -> f32 {
    let mut score = 0.0f32;
    if total > 1 {
        score += (index as f32 / (total - 1) as f32) * 0.3;
    }
    if message.is_system() {
        score += 0.4;
    }
    if !message.tool_calls.is_empty() {
        score += 0.3;
    }
    if matches!(message.role, Role::Tool) {
        score += 0.2;
    }
    if message.content.char_len() > 500 {
        score += 0.1;
    }
    score
}

/// Applies compression first; if the result is still over budget, applies
/// importance-based scoring over what compression produced.
fn hierarchical(messages: &[Message], target_tokens: u32) -> (Vec<Message>, Option<String>) {
    let (compressed, summary) = compression(messages);
    let compressed_tokens = estimate_tokens(None, &compressed, None, &[]);
    if compressed_tokens <= target_tokens {
        return (compressed, summary);
    }
    (importance_based(&compressed, target_tokens), summary)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use browzer_types::Message;

    fn filler(n: usize) -> Vec<Message> {
        (0..n).map(|i| Message::user(format!("message number {i} {}", "x".repeat(50)))).collect()
    }

    #[test]
    fn skips_compression_when_under_budget() {
        let messages = vec![Message::user("hi")];
        let result = optimize_messages(CompressionStrategy::SlidingWindow, &messages, None, None, &[], 10_000);
        assert!(!result.compression_applied);
        assert_eq!(result.tokens_saved, 0);
    }

    #[test]
    fn sliding_window_keeps_system_messages() {
        let mut messages = vec![Message::system("you are an agent")];
        messages.extend(filler(20));
        let result = optimize_messages(CompressionStrategy::SlidingWindow, &messages, None, None, &[], 50);
        assert!(result.optimized_messages.iter().any(|m| m.is_system()));
        assert!(result.optimized_messages.len() < messages.len());
    }

    #[test]
    fn compression_produces_a_summary_and_keeps_newer_half() {
        let messages = filler(10);
        let result = optimize_messages(CompressionStrategy::Compression, &messages, None, None, &[], 50);
        assert!(result.summary.is_some());
        assert!(result.optimized_messages.iter().any(|m| m.is_system()));
    }

    #[test]
    fn importance_based_restores_chronological_order() {
        let messages = filler(10);
        let result = optimize_messages(CompressionStrategy::ImportanceBased, &messages, None, None, &[], 80);
        let texts: Vec<String> = result.optimized_messages.iter().map(|m| m.content.as_text()).collect();
        let mut sorted = texts.clone();
        sorted.sort();
        // kept messages must appear in their original relative order, i.e.
        // message N always appears before message N+1 if both survive.
        let indices: Vec<usize> = texts
            .iter()
            .filter_map(|t| t.split_whitespace().nth(2).and_then(|n| n.parse::<usize>().ok()))
            .collect();
        let mut ordered = indices.clone();
        ordered.sort_unstable();
        assert_eq!(indices, ordered);
    }

    #[test]
    fn hierarchical_falls_back_to_importance_when_compression_insufficient() {
        let messages = filler(40);
        let result = optimize_messages(CompressionStrategy::Hierarchical, &messages, None, None, &[], 30);
        assert!(result.compression_applied);
        let tokens = estimate_tokens(None, &result.optimized_messages, None, &[]);
        assert!(tokens <= 30 || result.optimized_messages.len() <= 2);
    }
}
