//! Token estimation (§4.7): a char-count/4 heuristic rather than a real
//! tokenizer, since the point is a cheap, provider-agnostic upper bound for
//! budget decisions, not exact billing — providers report the authoritative
//! count back in `TokenUsage` after the call.

use browzer_types::{BrowserContext, Message, ToolSchema};

const CHARS_PER_TOKEN: usize = 4;
const IMAGE_TOKEN_COST: usize = 1000;

/// Approximates the token footprint of everything that will go into an LLM
/// request: system prompt, conversation messages, a serialized browser
/// context snapshot, and the tool schema catalogue.
pub fn estimate_tokens(
    system_prompt: Option<&str>,
    messages: &[Message],
    browser_context: Option<&BrowserContext>,
    tools: &[ToolSchema],
) -> u32 {
    let mut chars = 0usize;
    let mut image_tokens = 0usize;

    if let Some(prompt) = system_prompt {
        chars += prompt.chars().count();
    }

    for message in messages {
        chars += message.content.char_len();
        image_tokens += message.content.image_count() * IMAGE_TOKEN_COST;
        for tool_call in &message.tool_calls {
            chars += tool_call.function.name.chars().count();
            chars += tool_call.function.arguments.chars().count();
        }
    }

    if let Some(context) = browser_context {
        chars += estimate_browser_context_chars(context);
    }

    for tool in tools {
        chars += tool.name.chars().count();
        chars += tool.description.chars().count();
        chars += tool.parameters.to_string().chars().count();
    }

    let text_tokens = chars.div_ceil(CHARS_PER_TOKEN);
    (text_tokens + image_tokens) as u32
}

fn estimate_browser_context_chars(context: &BrowserContext) -> usize {
    let mut chars = context.page.url.chars().count() + context.page.title.chars().count();
    for element in &context.interactive_elements {
        chars += element.tag.chars().count() + element.text.chars().count();
    }
    for entry in &context.console_logs {
        chars += entry.message.chars().count();
    }
    for entry in &context.network_activity {
        chars += entry.url.chars().count();
    }
    chars
}

/// Average characters per message, used by the sliding-window strategy to
/// decide how many messages to drop.
pub fn average_tokens_per_message(messages: &[Message]) -> f64 {
    if messages.is_empty() {
        return 1.0;
    }
    let total: u32 = messages
        .iter()
        .map(|m| estimate_tokens(None, std::slice::from_ref(m), None, &[]))
        .sum();
    (total as f64 / messages.len() as f64).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use browzer_types::Message;

    #[test]
    fn empty_input_is_zero_tokens() {
        assert_eq!(estimate_tokens(None, &[], None, &[]), 0);
    }

    #[test]
    fn counts_chars_divided_by_four() {
        let messages = vec![Message::user("a".repeat(40))];
        assert_eq!(estimate_tokens(None, &messages, None, &[]), 10);
    }

    #[test]
    fn images_cost_a_flat_thousand_tokens() {
        use browzer_types::{ContentPart, MessageContent, Role};
        let message = browzer_types::Message {
            role: Role::User,
            content: MessageContent::Parts(vec![ContentPart::Image { url: "data:...".into() }]),
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
        };
        assert_eq!(estimate_tokens(None, &[message], None, &[]), 1000);
    }
}
