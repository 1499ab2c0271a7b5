//! System prompt construction (§4.9): rebuilt at every think step since it
//! carries the live iteration counter and mode.

use browzer_types::{ExecutionMode, ToolSchema};

pub fn build_system_prompt(tools: &[ToolSchema], mode: ExecutionMode, execution_count: u32, max_execution_steps: u32) -> String {
    let mut out = String::new();
    out.push_str(
        "You are an autonomous browser agent. You observe the current page, \
         think about the next step toward the user's goal, and act by calling \
         exactly one tool per turn.\n\n",
    );

    out.push_str("Available tools:\n");
    for tool in tools {
        out.push_str(&format!("- {}: {}\n", tool.name, first_sentence(&tool.description)));
    }

    out.push_str(
        "\nYou MUST respond with an actual function call to one of the tools \
         above. Do not describe the action in prose, do not write pseudocode, \
         and do not call more than one tool per turn.\n",
    );

    out.push_str(
        "When the goal has been fully achieved, or you determine it cannot be \
         achieved, reply with plain text (no tool call) stating so clearly, \
         e.g. \"Task complete: ...\" or \"I cannot ...\".\n\n",
    );

    out.push_str(&format!("Mode: {mode:?}\n"));
    out.push_str(&format!("Execution step: {execution_count}/{max_execution_steps}\n"));

    out
}

fn first_sentence(description: &str) -> &str {
    description.split(['.', '\n']).next().unwrap_or(description).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use browzer_types::ToolSchema;
    use serde_json::json;

    #[test]
    fn enumerates_every_tool_by_name() {
        let tools = vec![
            ToolSchema { name: "click_element".into(), description: "Click an element. Fails if not found.".into(), parameters: json!({}) },
            ToolSchema { name: "navigate_to_url".into(), description: "Navigate the tab.".into(), parameters: json!({}) },
        ];
        let prompt = build_system_prompt(&tools, ExecutionMode::Autonomous, 2, 20);
        assert!(prompt.contains("click_element: Click an element"));
        assert!(prompt.contains("navigate_to_url: Navigate the tab"));
        assert!(prompt.contains("Execution step: 2/20"));
    }

    #[test]
    fn mandates_function_call_form() {
        let prompt = build_system_prompt(&[], ExecutionMode::Autonomous, 0, 10);
        assert!(prompt.to_lowercase().contains("function call"));
        assert!(prompt.to_lowercase().contains("one tool per turn") || prompt.contains("more than one tool per turn"));
    }
}
