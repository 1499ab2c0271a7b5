//! Interactivity scoring table (§4.1).

use crate::model::RawDomNode;

const INTERACTIVE_TAGS: &[&str] = &[
    "button", "a", "input", "select", "textarea", "form", "label", "summary", "details",
];

const INTERACTIVE_ROLES: &[&str] = &[
    "button", "link", "textbox", "searchbox", "combobox", "checkbox", "radio", "menuitem", "tab",
    "switch", "dialog", "alertdialog", "navigation", "main",
];

pub const EXCLUDED_TAGS: &[&str] = &[
    "script", "style", "noscript", "meta", "link", "head", "title", "base", "template",
];

const FORM_TAGS: &[&str] = &["input", "select", "textarea", "button", "form"];

/// Computes the 0-100 interactivity score described in §4.1, before the
/// visibility/exclusion filters are applied.
pub fn interactivity_score(node: &RawDomNode) -> u8 {
    let tag = node.tag.to_ascii_lowercase();
    let attrs = &node.attributes;
    let mut score: i32 = 0;

    if INTERACTIVE_TAGS.contains(&tag.as_str()) {
        score += 40;
    }
    if attrs
        .role
        .as_deref()
        .map(|r| INTERACTIVE_ROLES.contains(&r.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
    {
        score += 40;
    }
    if attrs.href.is_some() {
        score += 30;
    }
    if FORM_TAGS.contains(&tag.as_str()) {
        score += 25;
    }
    let is_submit_or_button = attrs
        .element_type
        .as_deref()
        .map(|t| matches!(t.to_ascii_lowercase().as_str(), "submit" | "button"))
        .unwrap_or(false);
    if attrs.has_onclick || is_submit_or_button {
        score += 20;
    }
    if attrs.tabindex.map(|t| t >= 0).unwrap_or(false) {
        score += 15;
    }
    if attrs.test_id.is_some() || attrs.cy_id.is_some() {
        score += 15;
    }
    if node.style.cursor.as_deref() == Some("pointer") {
        score += 15;
    }
    if attrs.aria_label.is_some() {
        score += 10;
    }
    if attrs.aria_describedby.is_some() {
        score += 5;
    }

    score.clamp(0, 100) as u8
}

/// Whether a node should never be considered, irrespective of score: an
/// excluded tag, or not visible (display none / visibility hidden / opacity
/// zero / zero-size rect).
pub fn is_excluded(node: &RawDomNode) -> bool {
    let tag = node.tag.to_ascii_lowercase();
    EXCLUDED_TAGS.contains(&tag.as_str())
}

pub fn is_visible(node: &RawDomNode) -> bool {
    !node.style.is_hidden() && !node.rect.is_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawAttributes;

    #[test]
    fn button_with_role_and_onclick_caps_at_100() {
        let node = RawDomNode::element("button").with_attributes(RawAttributes {
            role: Some("button".into()),
            has_onclick: true,
            tabindex: Some(0),
            test_id: Some("x".into()),
            aria_label: Some("x".into()),
            ..Default::default()
        });
        assert_eq!(interactivity_score(&node), 100);
    }

    #[test]
    fn plain_div_scores_zero() {
        let node = RawDomNode::element("div");
        assert_eq!(interactivity_score(&node), 0);
    }

    #[test]
    fn script_tag_is_excluded() {
        assert!(is_excluded(&RawDomNode::element("script")));
        assert!(!is_excluded(&RawDomNode::element("button")));
    }
}
