//! The fixed set of 18 tools available to the agent (§4.5). Implementations
//! of the tools themselves are out of scope here — this module only owns
//! the name-to-schema catalogue; execution is dispatched through a
//! [`crate::handler::ToolHandler`].

use browzer_types::ToolSchema;
use serde_json::json;

/// Selector-accepting tools all share this argument shape.
fn selector_params(extra: serde_json::Value) -> serde_json::Value {
    let mut properties = serde_json::Map::new();
    properties.insert(
        "selector_strategy".to_string(),
        json!({ "type": "string", "enum": ["css", "text", "aria_label", "placeholder"] }),
    );
    properties.insert("selector_value".to_string(), json!({ "type": "string" }));
    if let Some(extra_props) = extra.get("properties").and_then(|v| v.as_object()) {
        for (k, v) in extra_props {
            properties.insert(k.clone(), v.clone());
        }
    }

    let mut required = vec![json!("selector_strategy"), json!("selector_value")];
    if let Some(extra_required) = extra.get("required").and_then(|v| v.as_array()) {
        required.extend(extra_required.iter().cloned());
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn empty_object_params() -> serde_json::Value {
    json!({ "type": "object", "properties": {} })
}

pub fn all_tools() -> Vec<ToolSchema> {
    vec![
        ToolSchema {
            name: "navigate_to_url".into(),
            description: "Navigate the active tab to a URL".into(),
            parameters: json!({
                "type": "object",
                "properties": { "url": { "type": "string" } },
                "required": ["url"]
            }),
        },
        ToolSchema {
            name: "go_back".into(),
            description: "Navigate back in browser history".into(),
            parameters: empty_object_params(),
        },
        ToolSchema {
            name: "go_forward".into(),
            description: "Navigate forward in browser history".into(),
            parameters: empty_object_params(),
        },
        ToolSchema {
            name: "reload_page".into(),
            description: "Reload the current page".into(),
            parameters: empty_object_params(),
        },
        ToolSchema {
            name: "click_element".into(),
            description: "Click an element identified by a selector".into(),
            parameters: selector_params(json!({})),
        },
        ToolSchema {
            name: "type_text".into(),
            description: "Type text into an element identified by a selector".into(),
            parameters: selector_params(json!({
                "properties": { "text": { "type": "string" } },
                "required": ["text"]
            })),
        },
        ToolSchema {
            name: "press_key".into(),
            description: "Press a single keyboard key, optionally on a focused element".into(),
            parameters: json!({
                "type": "object",
                "properties": { "key": { "type": "string" } },
                "required": ["key"]
            }),
        },
        ToolSchema {
            name: "select_option".into(),
            description: "Select one or more options in a <select> element".into(),
            parameters: selector_params(json!({
                "properties": { "values": { "type": "array", "items": { "type": "string" } } },
                "required": ["values"]
            })),
        },
        ToolSchema {
            name: "check_checkbox".into(),
            description: "Set the checked state of a checkbox or radio element".into(),
            parameters: selector_params(json!({
                "properties": { "checked": { "type": "boolean" } },
                "required": ["checked"]
            })),
        },
        ToolSchema {
            name: "submit_form".into(),
            description: "Submit the form containing a selected element".into(),
            parameters: selector_params(json!({})),
        },
        ToolSchema {
            name: "get_page_info".into(),
            description: "Retrieve the current page's URL, title and ready state".into(),
            parameters: empty_object_params(),
        },
        ToolSchema {
            name: "find_element".into(),
            description: "Find an element matching a selector and return its details".into(),
            parameters: selector_params(json!({})),
        },
        ToolSchema {
            name: "verify_element_exists".into(),
            description: "Check whether an element matching a selector exists".into(),
            parameters: selector_params(json!({})),
        },
        ToolSchema {
            name: "verify_text_present".into(),
            description: "Check whether given text is present on the page".into(),
            parameters: json!({
                "type": "object",
                "properties": { "text": { "type": "string" } },
                "required": ["text"]
            }),
        },
        ToolSchema {
            name: "get_element_text".into(),
            description: "Read the text content of an element identified by a selector".into(),
            parameters: selector_params(json!({})),
        },
        ToolSchema {
            name: "get_element_attribute".into(),
            description: "Read an attribute value of an element identified by a selector".into(),
            parameters: selector_params(json!({
                "properties": { "attribute": { "type": "string" } },
                "required": ["attribute"]
            })),
        },
        ToolSchema {
            name: "wait_for_element".into(),
            description: "Wait until an element matching a selector appears".into(),
            parameters: selector_params(json!({
                "properties": { "timeout_ms": { "type": "integer" } }
            })),
        },
        ToolSchema {
            name: "take_screenshot".into(),
            description: "Capture a screenshot of the current page".into(),
            parameters: empty_object_params(),
        },
    ]
}

pub const TOOL_COUNT: usize = 18;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_has_exactly_the_named_tools() {
        let names: Vec<&str> = all_tools().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names.len(), TOOL_COUNT);
        for expected in [
            "navigate_to_url", "go_back", "go_forward", "reload_page", "click_element",
            "type_text", "press_key", "select_option", "check_checkbox", "submit_form",
            "get_page_info", "find_element", "verify_element_exists", "verify_text_present",
            "get_element_text", "get_element_attribute", "wait_for_element", "take_screenshot",
        ] {
            assert!(names.contains(&expected), "missing tool {expected}");
        }
    }

    #[test]
    fn selector_tools_require_strategy_and_value() {
        let click = all_tools().into_iter().find(|t| t.name == "click_element").unwrap();
        let required = click.parameters["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "selector_strategy"));
        assert!(required.iter().any(|v| v == "selector_value"));
    }
}
