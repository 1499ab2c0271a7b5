//! Depth-bounded traversal that turns a [`RawDomNode`] tree into the ranked,
//! capped `InteractiveElement` list described in §4.1.

use browzer_types::{BoundingRect, ElementAttributes, InteractiveElement};

use crate::model::RawDomNode;
use crate::scoring::{interactivity_score, is_excluded, is_visible};
use crate::selectors::{self, candidates, PathSegment};

#[derive(Clone, Copy, Debug)]
pub struct PruneOptions {
    pub max_depth: usize,
    pub min_interactivity_score: u8,
    pub max_elements: usize,
}

impl Default for PruneOptions {
    fn default() -> Self {
        Self {
            max_depth: 5,
            min_interactivity_score: 30,
            max_elements: 50,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PruneStats {
    pub total: usize,
    pub pruned: usize,
}

#[derive(Clone, Debug, Default)]
pub struct PruneOutcome {
    pub elements: Vec<InteractiveElement>,
    pub stats: PruneStats,
}

struct Candidate {
    element: InteractiveElement,
    score: u8,
}

/// Walks `root` and returns the pruned, ranked element set. Never panics or
/// propagates an error: on any internal inconsistency it falls back to an
/// empty outcome, per §4.1's "never throw" edge case.
pub fn prune(root: &RawDomNode, options: PruneOptions) -> PruneOutcome {
    let mut total = 0usize;
    let mut found = Vec::new();
    walk(root, &[], 0, options.max_depth, &mut total, &mut found);

    found.retain(|c| c.score >= options.min_interactivity_score);
    found.sort_by(|a, b| b.score.cmp(&a.score));
    let pruned_to = found.len().min(options.max_elements);
    let pruned = found.len().saturating_sub(pruned_to);
    found.truncate(pruned_to);

    PruneOutcome {
        elements: found.into_iter().map(|c| c.element).collect(),
        stats: PruneStats { total, pruned },
    }
}

fn walk(
    node: &RawDomNode,
    path: &[PathSegment],
    depth: usize,
    max_depth: usize,
    total: &mut usize,
    out: &mut Vec<Candidate>,
) {
    if depth > max_depth {
        return;
    }
    *total += 1;

    if !is_excluded(node) {
        if let Some(candidate) = evaluate_node(node, path) {
            out.push(candidate);
        }
    }

    if depth == max_depth {
        return;
    }

    let mut tag_counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    for child in &node.children {
        let tag = child.tag.to_ascii_lowercase();
        let nth = *tag_counts.entry(tag.clone()).or_insert(0) + 1;
        tag_counts.insert(tag, nth);

        let mut child_path = path.to_vec();
        child_path.push(selectors::path_segment(child, nth));
        walk(child, &child_path, depth + 1, max_depth, total, out);
    }
}

fn evaluate_node(node: &RawDomNode, path: &[PathSegment]) -> Option<Candidate> {
    let score = interactivity_score(node);
    let visible = is_visible(node);
    if !visible {
        return None;
    }

    let selector_candidates = candidates(node, path);
    let best = selector_candidates.first().cloned()?;

    let text: String = node.text.trim().chars().take(100).collect();
    let element = InteractiveElement {
        tag: node.tag.to_ascii_lowercase(),
        selectors: selector_candidates,
        best_selector: best,
        rect: BoundingRect {
            x: node.rect.x,
            y: node.rect.y,
            width: node.rect.width,
            height: node.rect.height,
        },
        attributes: ElementAttributes {
            id: node.attributes.id.clone(),
            class: node.attributes.class.clone(),
            role: node.attributes.role.clone(),
            aria_label: node.attributes.aria_label.clone(),
            placeholder: node.attributes.placeholder.clone(),
            value: node.attributes.value.clone(),
            href: node.attributes.href.clone(),
            test_id: node.attributes.test_id.clone(),
        },
        text,
        is_visible: visible,
        is_interactive: score >= 30,
        interactivity_score: score,
    };

    Some(Candidate { element, score })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawAttributes;

    fn button(id: &str) -> RawDomNode {
        RawDomNode::element("button")
            .with_attributes(RawAttributes {
                id: Some(id.into()),
                role: Some("button".into()),
                has_onclick: true,
                ..Default::default()
            })
            .with_rect(crate::model::RawRect {
                x: 0.0,
                y: 0.0,
                width: 80.0,
                height: 30.0,
            })
            .with_text("Go")
    }

    #[test]
    fn scenario_best_selector_is_id_with_score_95() {
        let node = RawDomNode::element("button")
            .with_attributes(RawAttributes {
                id: Some("go".into()),
                test_id: Some("submit".into()),
                aria_label: Some("Submit".into()),
                role: Some("button".into()),
                has_onclick: true,
                ..Default::default()
            })
            .with_rect(crate::model::RawRect {
                x: 0.0,
                y: 0.0,
                width: 80.0,
                height: 30.0,
            })
            .with_text("Submit");
        let root = RawDomNode::element("body").with_children(vec![node]);

        let outcome = prune(&root, PruneOptions::default());
        assert_eq!(outcome.elements.len(), 1);
        let el = &outcome.elements[0];
        assert_eq!(el.best_selector.value, "#go");
        assert_eq!(el.best_selector.confidence, 95);
    }

    #[test]
    fn hidden_elements_are_never_returned() {
        let hidden = RawDomNode::element("button")
            .with_attributes(RawAttributes {
                id: Some("hidden-btn".into()),
                role: Some("button".into()),
                ..Default::default()
            })
            .with_rect(crate::model::RawRect::default());
        let root = RawDomNode::element("body").with_children(vec![hidden]);
        let outcome = prune(&root, PruneOptions::default());
        assert!(outcome.elements.is_empty());
    }

    #[test]
    fn max_elements_caps_output_and_counts_pruned() {
        let children: Vec<_> = (0..10).map(|i| button(&format!("b{i}"))).collect();
        let root = RawDomNode::element("body").with_children(children);
        let opts = PruneOptions {
            max_elements: 3,
            ..Default::default()
        };
        let outcome = prune(&root, opts);
        assert_eq!(outcome.elements.len(), 3);
        assert_eq!(outcome.stats.pruned, 7);
    }

    #[test]
    fn empty_document_never_panics() {
        let root = RawDomNode::element("html");
        let outcome = prune(&root, PruneOptions::default());
        assert!(outcome.elements.is_empty());
        assert_eq!(outcome.stats.total, 1);
    }
}
