//! Concise observation summaries (§4.9 step 1) distinct from
//! `browser_context::context_to_text`'s full prompt rendering: this is the
//! short line published on the `observation` event and folded into the
//! conversation as a user message.

use browzer_types::BrowserContext;

pub fn summarize_observation(context: &BrowserContext) -> String {
    let mut buttons = 0usize;
    let mut inputs = 0usize;
    let mut links = 0usize;
    for element in &context.interactive_elements {
        match element.tag.to_ascii_lowercase().as_str() {
            "button" => buttons += 1,
            "input" | "textarea" | "select" => inputs += 1,
            "a" => links += 1,
            _ => {}
        }
    }

    format!(
        "Page: {} | URL: {} | Elements: {} total ({} interactive, {} visible) | buttons={buttons} inputs={inputs} links={links} | recent console entries: {}",
        context.page.title,
        context.page.url,
        context.element_counts.total,
        context.element_counts.interactive,
        context.element_counts.visible,
        context.console_logs.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use browzer_types::*;
    use chrono::Utc;

    #[test]
    fn tallies_buttons_inputs_and_links() {
        let mut ctx = BrowserContext {
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
            element_counts: ElementCounts::new(3, 3, 3),
            visual: None,
            captured_at: Utc::now(),
        };
        for tag in ["button", "input", "a"] {
            ctx.interactive_elements.push(InteractiveElement {
                tag: tag.to_string(),
                selectors: vec![],
                best_selector: SelectorCandidate { strategy: SelectorStrategy::Id, value: "#x".into(), confidence: 90 },
                rect: BoundingRect::default(),
                attributes: ElementAttributes::default(),
                text: String::new(),
                is_visible: true,
                is_interactive: true,
                interactivity_score: 80,
            });
        }
        let summary = summarize_observation(&ctx);
        assert!(summary.contains("buttons=1 inputs=1 links=1"));
        assert!(summary.contains("Example"));
        assert!(summary.contains("https://example.com"));
    }
}
