//! Deterministic plain-text rendering for LLM prompts (§4.3).

use browzer_types::BrowserContext;

const MAX_ELEMENTS_IN_TEXT: usize = 50;

pub fn context_to_text(context: &BrowserContext) -> String {
    let mut out = String::new();

    out.push_str("=== CURRENT PAGE ===\n");
    out.push_str(&format!("URL: {}\n", context.page.url));
    out.push_str(&format!("Title: {}\n", context.page.title));
    out.push_str(&format!("Ready state: {:?}\n", context.page.ready_state));
    out.push_str(&format!(
        "Elements: {} total, {} interactive, {} visible\n",
        context.element_counts.total, context.element_counts.interactive, context.element_counts.visible
    ));

    out.push_str("\n=== INTERACTIVE ELEMENTS ===\n");
    if context.interactive_elements.is_empty() {
        out.push_str("(none)\n");
    } else {
        for (i, el) in context.interactive_elements.iter().take(MAX_ELEMENTS_IN_TEXT).enumerate() {
            out.push_str(&format!(
                "{}. <{}> \"{}\" selector={} score={}\n",
                i + 1,
                el.tag,
                el.text,
                el.best_selector.value,
                el.interactivity_score
            ));
        }
    }

    out.push_str("\n=== ACCESSIBILITY TREE ===\n");
    match &context.accessibility_tree {
        Some(tree) => match &tree.tree {
            Some(root) => render_a11y_node(root, 0, &mut out),
            None => out.push_str("(empty)\n"),
        },
        None => out.push_str("(not requested)\n"),
    }

    out.push_str("\n=== RECENT CONSOLE LOGS ===\n");
    if context.console_logs.is_empty() {
        out.push_str("(none)\n");
    } else {
        for entry in &context.console_logs {
            out.push_str(&format!("[{:?}] {}\n", entry.level, entry.message));
        }
    }

    out.push_str("\n=== RECENT NETWORK ACTIVITY ===\n");
    if context.network_activity.is_empty() {
        out.push_str("(none)\n");
    } else {
        for entry in &context.network_activity {
            let status = entry
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| if entry.failed { "failed".to_string() } else { "pending".to_string() });
            out.push_str(&format!("{} {} -> {}\n", entry.method, entry.url, status));
        }
    }

    out
}

fn render_a11y_node(node: &browzer_types::AccessibilityNode, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let name = node.name.as_deref().unwrap_or("");
    out.push_str(&format!("{indent}- {} \"{}\"\n", node.role, name));
    for child in &node.children {
        render_a11y_node(child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use browzer_types::*;
    use chrono::Utc;

    fn empty_context() -> BrowserContext {
        BrowserContext {
            page: PageMetadata {
                url: "https://example.com".into(),
                title: "Example".into(),
                ready_state: ReadyState::Complete,
                scroll_position: ScrollPosition::default(),
                viewport: Viewport::default(),
            },
            interactive_elements: vec![],
            accessibility_tree: None,
            console_logs: vec![],
            network_activity: vec![],
            element_counts: ElementCounts::new(0, 0, 0),
            visual: None,
            captured_at: Utc::now(),
        }
    }

    #[test]
    fn renders_all_five_section_headers_in_order() {
        let text = context_to_text(&empty_context());
        let headers = [
            "=== CURRENT PAGE ===",
            "=== INTERACTIVE ELEMENTS ===",
            "=== ACCESSIBILITY TREE ===",
            "=== RECENT CONSOLE LOGS ===",
            "=== RECENT NETWORK ACTIVITY ===",
        ];
        let mut last_pos = 0;
        for header in headers {
            let pos = text.find(header).expect("missing header");
            assert!(pos >= last_pos);
            last_pos = pos;
        }
    }

    #[test]
    fn caps_interactive_elements_at_fifty() {
        let mut ctx = empty_context();
        for i in 0..60 {
            ctx.interactive_elements.push(InteractiveElement {
                tag: "button".into(),
                selectors: vec![],
                best_selector: SelectorCandidate {
                    strategy: SelectorStrategy::Id,
                    value: format!("#b{i}"),
                    confidence: 95,
                },
                rect: BoundingRect::default(),
                attributes: ElementAttributes::default(),
                text: format!("btn{i}"),
                is_visible: true,
                is_interactive: true,
                interactivity_score: 90,
            });
        }
        let text = context_to_text(&ctx);
        assert_eq!(text.matches("<button>").count(), MAX_ELEMENTS_IN_TEXT);
    }
}
