//! Multi-strategy selector generation & ranking (§4.1).

use once_cell::sync::Lazy;
use regex::Regex;

use browzer_types::{SelectorCandidate, SelectorStrategy};

use crate::model::RawDomNode;

static FRAMEWORK_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(ng-|_|css-)").unwrap());

/// One ancestor step recorded while walking down to a node, used to
/// synthesize a CSS structural path and an XPath.
#[derive(Clone, Debug)]
pub struct PathSegment {
    pub tag: String,
    pub classes: Vec<String>,
    /// 1-based position among same-tag siblings under the same parent.
    pub nth_of_type: usize,
}

fn escape_css_value(value: &str) -> String {
    value.replace('"', "\\\"")
}

fn clean_classes(raw: &Option<String>) -> Vec<String> {
    raw.as_deref()
        .map(|c| {
            c.split_whitespace()
                .filter(|cls| !cls.is_empty() && !FRAMEWORK_CLASS.is_match(cls))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn css_structural_path(path: &[PathSegment]) -> String {
    path.iter()
        .map(|seg| {
            let classes = seg
                .classes
                .iter()
                .map(|c| format!(".{c}"))
                .collect::<String>();
            if classes.is_empty() {
                format!("{}:nth-of-type({})", seg.tag, seg.nth_of_type)
            } else {
                format!("{}{}", seg.tag, classes)
            }
        })
        .collect::<Vec<_>>()
        .join(" > ")
}

fn xpath(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for seg in path {
        out.push('/');
        out.push_str(&seg.tag);
        out.push('[');
        out.push_str(&seg.nth_of_type.to_string());
        out.push(']');
    }
    out
}

/// Build the full ranked list of selector candidates for `node`, given the
/// ancestor chain leading to it (last entry is the node itself).
pub fn candidates(node: &RawDomNode, path: &[PathSegment]) -> Vec<SelectorCandidate> {
    let attrs = &node.attributes;
    let mut out = Vec::new();

    if let Some(id) = attrs.id.as_deref().filter(|s| !s.is_empty()) {
        out.push(SelectorCandidate {
            strategy: SelectorStrategy::Id,
            value: format!("#{id}"),
            confidence: 95,
        });
    }
    if let Some(test_id) = attrs.test_id.as_deref().filter(|s| !s.is_empty()) {
        out.push(SelectorCandidate {
            strategy: SelectorStrategy::TestId,
            value: format!("[data-testid=\"{}\"]", escape_css_value(test_id)),
            confidence: 90,
        });
    }
    if let Some(cy_id) = attrs.cy_id.as_deref().filter(|s| !s.is_empty()) {
        out.push(SelectorCandidate {
            strategy: SelectorStrategy::DataCy,
            value: format!("[data-cy=\"{}\"]", escape_css_value(cy_id)),
            confidence: 90,
        });
    }
    if let Some(label) = attrs.aria_label.as_deref().filter(|s| !s.is_empty()) {
        out.push(SelectorCandidate {
            strategy: SelectorStrategy::AriaLabel,
            value: format!("[aria-label=\"{}\"]", escape_css_value(label)),
            confidence: 80,
        });
    }
    if let Some(role) = attrs.role.as_deref().filter(|s| !s.is_empty()) {
        let name = attrs.aria_label.clone().unwrap_or_default();
        out.push(SelectorCandidate {
            strategy: SelectorStrategy::RoleName,
            value: format!("[role=\"{role}\"][name=\"{}\"]", escape_css_value(&name)),
            confidence: 75,
        });
    }
    let text = node.text.trim();
    if !text.is_empty() {
        let snippet: String = text.chars().take(40).collect();
        out.push(SelectorCandidate {
            strategy: SelectorStrategy::TagText,
            value: format!("{}:text(\"{}\")", node.tag, escape_css_value(&snippet)),
            confidence: 70,
        });
    }
    if !path.is_empty() {
        out.push(SelectorCandidate {
            strategy: SelectorStrategy::CssPath,
            value: css_structural_path(path),
            confidence: 60,
        });
        out.push(SelectorCandidate {
            strategy: SelectorStrategy::XPath,
            value: xpath(path),
            confidence: 50,
        });
    }

    out.sort_by(|a, b| b.confidence.cmp(&a.confidence));
    out
}

pub fn path_segment(node: &RawDomNode, nth_of_type: usize) -> PathSegment {
    PathSegment {
        tag: node.tag.to_ascii_lowercase(),
        classes: clean_classes(&node.attributes.class),
        nth_of_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawAttributes;

    #[test]
    fn id_is_highest_confidence_when_present() {
        let node = RawDomNode::element("button").with_attributes(RawAttributes {
            id: Some("go".into()),
            test_id: Some("submit".into()),
            aria_label: Some("Submit".into()),
            ..Default::default()
        });
        let list = candidates(&node, &[]);
        assert_eq!(list[0].strategy, SelectorStrategy::Id);
        assert_eq!(list[0].value, "#go");
        assert_eq!(list[0].confidence, 95);
        assert!(list.len() >= 3);
    }

    #[test]
    fn framework_classes_filtered_from_css_path() {
        let segs = vec![PathSegment {
            tag: "div".into(),
            classes: vec!["ng-scope".into(), "real-class".into()],
            nth_of_type: 1,
        }];
        let path = css_structural_path(&segs);
        assert!(!path.contains("ng-scope"));
        assert!(path.contains("real-class"));
    }
}
