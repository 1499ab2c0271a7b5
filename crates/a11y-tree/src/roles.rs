//! Implicit tag→role mapping (§4.2).

use crate::model::RawA11yNode;

/// Infers the implicit ARIA role for a node, honoring any explicit `role`
/// attribute first.
pub fn implicit_role(node: &RawA11yNode) -> String {
    if let Some(role) = node.attributes.role.as_deref().filter(|r| !r.is_empty()) {
        return role.to_string();
    }

    let tag = node.tag.to_ascii_lowercase();
    match tag.as_str() {
        "a" if node.attributes.href.is_some() => "link".to_string(),
        "a" => "generic".to_string(),
        "button" => "button".to_string(),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => "heading".to_string(),
        "nav" => "navigation".to_string(),
        "main" => "main".to_string(),
        "header" => "banner".to_string(),
        "footer" => "contentinfo".to_string(),
        "aside" => "complementary".to_string(),
        "form" => "form".to_string(),
        "img" => "img".to_string(),
        "ul" | "ol" => "list".to_string(),
        "li" => "listitem".to_string(),
        "table" => "table".to_string(),
        "textarea" => "textbox".to_string(),
        "select" => "combobox".to_string(),
        "input" => input_role(node.attributes.element_type.as_deref()),
        "dialog" => "dialog".to_string(),
        "article" => "article".to_string(),
        "section" => "region".to_string(),
        "label" => "label".to_string(),
        _ => "generic".to_string(),
    }
}

/// Roles that carry no accessible semantics of their own (§4.2: "Only
/// nodes with a resolvable semantic role are included"). A node whose
/// implicit or explicit role resolves to one of these is excluded from the
/// emitted tree, though its descendants are still walked and promoted.
const NON_SEMANTIC_ROLES: &[&str] = &["generic", "presentation", "none"];

pub fn is_semantic_role(role: &str) -> bool {
    !NON_SEMANTIC_ROLES.contains(&role)
}

fn input_role(element_type: Option<&str>) -> String {
    match element_type.unwrap_or("text").to_ascii_lowercase().as_str() {
        "checkbox" => "checkbox".to_string(),
        "radio" => "radio".to_string(),
        "range" => "slider".to_string(),
        "submit" | "button" => "button".to_string(),
        "search" => "searchbox".to_string(),
        _ => "textbox".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawA11yAttributes;

    #[test]
    fn anchor_with_href_is_link() {
        let node = RawA11yNode::element("a").with_attributes(RawA11yAttributes {
            href: Some("/x".into()),
            ..Default::default()
        });
        assert_eq!(implicit_role(&node), "link");
    }

    #[test]
    fn heading_tags_map_to_heading() {
        for tag in ["h1", "h3", "h6"] {
            assert_eq!(implicit_role(&RawA11yNode::element(tag)), "heading");
        }
    }

    #[test]
    fn explicit_role_wins_over_implicit() {
        let node = RawA11yNode::element("div").with_attributes(RawA11yAttributes {
            role: Some("tab".into()),
            ..Default::default()
        });
        assert_eq!(implicit_role(&node), "tab");
    }

    #[test]
    fn checkbox_input_maps_to_checkbox_role() {
        let node = RawA11yNode::element("input").with_attributes(RawA11yAttributes {
            element_type: Some("checkbox".into()),
            ..Default::default()
        });
        assert_eq!(implicit_role(&node), "checkbox");
    }

    #[test]
    fn div_span_and_unknown_tags_resolve_to_generic() {
        for tag in ["div", "span", "p", "some-custom-element"] {
            assert_eq!(implicit_role(&RawA11yNode::element(tag)), "generic");
        }
    }

    #[test]
    fn generic_presentation_and_none_are_not_semantic() {
        assert!(!is_semantic_role("generic"));
        assert!(!is_semantic_role("presentation"));
        assert!(!is_semantic_role("none"));
        assert!(is_semantic_role("button"));
        assert!(is_semantic_role("link"));
    }
}
