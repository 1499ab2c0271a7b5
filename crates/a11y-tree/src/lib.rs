//! Accessibility Tree Extractor (§4.2).
//!
//! Emits a role/name tree from a live DOM snapshot, bounded by depth and
//! node count so it stays cheap to feed into an LLM prompt. Like
//! `dom-pruner`, this crate is a pure function over a pre-walked node tree;
//! `browser-context` owns talking to CDP.

pub mod extract;
pub mod model;
pub mod name;
pub mod roles;

pub use extract::{extract, A11yOptions};
pub use model::{RawA11yAttributes, RawA11yNode};
pub use name::accessible_name;
pub use roles::{implicit_role, is_semantic_role};

pub use browzer_types::{AccessibilityNode, AccessibilityTree};

/// Thin stateless entry point mirroring `dom_pruner::DomPruner`'s shape.
#[derive(Default)]
pub struct A11yTreeExtractor;

impl A11yTreeExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, root: &RawA11yNode, options: A11yOptions) -> AccessibilityTree {
        extract::extract(root, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::RawA11yAttributes;

    #[test]
    fn extractor_produces_rooted_tree() {
        let extractor = A11yTreeExtractor::new();
        let root = RawA11yNode::element("body").with_children(vec![RawA11yNode::element("h1")
            .with_attributes(RawA11yAttributes::default())
            .with_text("Welcome")]);
        let tree = extractor.extract(&root, A11yOptions::default());
        let root_node = tree.tree.unwrap();
        assert_eq!(root_node.children[0].role, "heading");
        assert_eq!(root_node.children[0].name.as_deref(), Some("Welcome"));
        assert!(!tree.truncated);
    }
}
