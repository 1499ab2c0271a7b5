//! Accessible name resolution order (§4.2):
//! `aria-label` → `aria-labelledby` text → label element → placeholder
//! (inputs) → alt/title (images) → text content (links/buttons) → title
//! attribute → truncated text content.

use crate::model::RawA11yNode;

const MAX_NAME_LEN: usize = 150;

fn truncate(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX_NAME_LEN {
        trimmed.to_string()
    } else {
        let snippet: String = trimmed.chars().take(MAX_NAME_LEN).collect();
        format!("{snippet}...")
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub fn accessible_name(node: &RawA11yNode) -> Option<String> {
    let attrs = &node.attributes;
    let tag = node.tag.to_ascii_lowercase();

    if let Some(label) = non_empty(&attrs.aria_label) {
        return Some(truncate(label));
    }
    if let Some(label) = non_empty(&attrs.aria_labelledby_text) {
        return Some(truncate(label));
    }
    if let Some(label) = non_empty(&attrs.label_text) {
        return Some(truncate(label));
    }
    if tag == "input" || tag == "textarea" {
        if let Some(placeholder) = non_empty(&attrs.placeholder) {
            return Some(truncate(placeholder));
        }
    }
    if tag == "img" {
        if let Some(alt) = non_empty(&attrs.alt) {
            return Some(truncate(alt));
        }
        if let Some(title) = non_empty(&attrs.title) {
            return Some(truncate(title));
        }
    }
    if matches!(tag.as_str(), "a" | "button") {
        if !node.text.trim().is_empty() {
            return Some(truncate(&node.text));
        }
    }
    if let Some(title) = non_empty(&attrs.title) {
        return Some(truncate(title));
    }
    if !node.text.trim().is_empty() {
        return Some(truncate(&node.text));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawA11yAttributes;

    #[test]
    fn aria_label_wins_over_everything() {
        let node = RawA11yNode::element("button")
            .with_attributes(RawA11yAttributes {
                aria_label: Some("Submit form".into()),
                ..Default::default()
            })
            .with_text("Go");
        assert_eq!(accessible_name(&node).as_deref(), Some("Submit form"));
    }

    #[test]
    fn input_falls_back_to_placeholder() {
        let node = RawA11yNode::element("input").with_attributes(RawA11yAttributes {
            placeholder: Some("Search...".into()),
            ..Default::default()
        });
        assert_eq!(accessible_name(&node).as_deref(), Some("Search..."));
    }

    #[test]
    fn image_falls_back_to_alt_then_title() {
        let alt_node = RawA11yNode::element("img").with_attributes(RawA11yAttributes {
            alt: Some("A cat".into()),
            title: Some("unused".into()),
            ..Default::default()
        });
        assert_eq!(accessible_name(&alt_node).as_deref(), Some("A cat"));

        let title_only = RawA11yNode::element("img").with_attributes(RawA11yAttributes {
            title: Some("A dog".into()),
            ..Default::default()
        });
        assert_eq!(accessible_name(&title_only).as_deref(), Some("A dog"));
    }

    #[test]
    fn link_falls_back_to_text_content() {
        let node = RawA11yNode::element("a").with_text("Home");
        assert_eq!(accessible_name(&node).as_deref(), Some("Home"));
    }

    #[test]
    fn long_text_is_truncated_with_ellipsis() {
        let long = "x".repeat(200);
        let node = RawA11yNode::element("div").with_text(long);
        let name = accessible_name(&node).unwrap();
        assert!(name.ends_with("..."));
        assert_eq!(name.chars().count(), MAX_NAME_LEN + 3);
    }
}
