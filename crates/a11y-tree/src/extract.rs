//! Depth- and node-capped tree extraction (§4.2).

use browzer_types::{AccessibilityNode, AccessibilityTree};

use crate::model::RawA11yNode;
use crate::name::accessible_name;
use crate::roles::{implicit_role, is_semantic_role};

#[derive(Clone, Copy, Debug)]
pub struct A11yOptions {
    pub max_depth: usize,
    pub max_nodes: usize,
}

impl Default for A11yOptions {
    fn default() -> Self {
        Self {
            max_depth: 10,
            max_nodes: 200,
        }
    }
}

struct Walker {
    max_depth: usize,
    max_nodes: usize,
    visited: usize,
    truncated: bool,
}

/// Extracts the accessibility tree rooted at `root` (conventionally
/// `document.body`).
pub fn extract(root: &RawA11yNode, options: A11yOptions) -> AccessibilityTree {
    let mut walker = Walker {
        max_depth: options.max_depth,
        max_nodes: options.max_nodes,
        visited: 0,
        truncated: false,
    };
    let tree = walker.visit_root(root);

    AccessibilityTree {
        tree,
        node_count: walker.visited,
        truncated: walker.truncated,
    }
}

impl Walker {
    /// The conventional entry point (`document.body`) is always emitted as
    /// the tree's single root, whatever role it resolves to, so the result
    /// stays a single `Option<AccessibilityNode>` rather than a forest.
    fn visit_root(&mut self, node: &RawA11yNode) -> Option<AccessibilityNode> {
        if node.hidden {
            return None;
        }
        if self.visited >= self.max_nodes {
            self.truncated = true;
            return None;
        }
        self.visited += 1;
        let children = self.visit_children(&node.children, 1);
        Some(self.build_node(node, children))
    }

    /// Visits one node, returning zero, one, or (when the node itself is
    /// filtered out) several promoted descendant nodes. Only nodes whose
    /// role resolves to a semantic one are emitted (§4.2); a `generic`/
    /// `presentation`/`none` node is skipped but its children are still
    /// walked and spliced into the parent's child list in its place.
    fn visit_node(&mut self, node: &RawA11yNode, depth: usize) -> Vec<AccessibilityNode> {
        if node.hidden {
            return Vec::new();
        }
        if self.visited >= self.max_nodes {
            self.truncated = true;
            return Vec::new();
        }

        let role = implicit_role(node);
        if is_semantic_role(&role) {
            self.visited += 1;
            let children = self.visit_children(&node.children, depth + 1);
            vec![self.build_node_with_role(node, role, children)]
        } else {
            self.visit_children(&node.children, depth + 1)
        }
    }

    fn visit_children(&mut self, children: &[RawA11yNode], depth: usize) -> Vec<AccessibilityNode> {
        if depth > self.max_depth {
            if !children.is_empty() {
                self.truncated = true;
            }
            return Vec::new();
        }

        let mut out = Vec::new();
        for child in children {
            if self.visited >= self.max_nodes {
                self.truncated = true;
                break;
            }
            out.extend(self.visit_node(child, depth));
        }
        out
    }

    fn build_node(&self, node: &RawA11yNode, children: Vec<AccessibilityNode>) -> AccessibilityNode {
        self.build_node_with_role(node, implicit_role(node), children)
    }

    fn build_node_with_role(&self, node: &RawA11yNode, role: String, children: Vec<AccessibilityNode>) -> AccessibilityNode {
        AccessibilityNode {
            role,
            name: accessible_name(node),
            description: node.attributes.aria_describedby_text.clone(),
            value: node.attributes.value.clone(),
            focused: Some(node.attributes.focused).filter(|f| *f),
            disabled: Some(node.attributes.disabled).filter(|d| *d),
            children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawA11yAttributes;

    #[test]
    fn hidden_subtree_is_skipped() {
        let hidden = RawA11yNode::element("div").hidden(true).with_text("invisible");
        let root = RawA11yNode::element("body").with_children(vec![hidden]);
        let tree = extract(&root, A11yOptions::default());
        assert_eq!(tree.tree.unwrap().children.len(), 0);
    }

    #[test]
    fn node_cap_marks_truncated() {
        let children: Vec<_> = (0..5).map(|i| RawA11yNode::element("button").with_text(format!("n{i}"))).collect();
        let root = RawA11yNode::element("body").with_children(children);
        let tree = extract(&root, A11yOptions { max_depth: 10, max_nodes: 3 });
        assert!(tree.truncated);
        assert_eq!(tree.node_count, 3);
    }

    #[test]
    fn depth_cap_stops_descent() {
        let leaf = RawA11yNode::element("button").with_text("deep");
        let mid = RawA11yNode::element("nav").with_children(vec![leaf]);
        let root = RawA11yNode::element("body").with_children(vec![mid]);
        let tree = extract(&root, A11yOptions { max_depth: 1, max_nodes: 200 });
        assert!(tree.truncated);
        let body = tree.tree.unwrap();
        assert_eq!(body.children.len(), 1);
        assert!(body.children[0].children.is_empty());
    }

    #[test]
    fn link_role_and_name_resolved() {
        let link = RawA11yNode::element("a")
            .with_attributes(RawA11yAttributes {
                href: Some("/home".into()),
                ..Default::default()
            })
            .with_text("Home");
        let root = RawA11yNode::element("body").with_children(vec![link]);
        let tree = extract(&root, A11yOptions::default());
        let child = &tree.tree.unwrap().children[0];
        assert_eq!(child.role, "link");
        assert_eq!(child.name.as_deref(), Some("Home"));
    }

    #[test]
    fn generic_wrapper_is_skipped_but_its_semantic_children_are_promoted() {
        let button = RawA11yNode::element("button").with_text("Save");
        let wrapper = RawA11yNode::element("div").with_children(vec![button]);
        let root = RawA11yNode::element("body").with_children(vec![wrapper]);
        let tree = extract(&root, A11yOptions::default());
        let body = tree.tree.unwrap();
        assert_eq!(body.children.len(), 1);
        assert_eq!(body.children[0].role, "button");
        assert_eq!(tree.node_count, 2);
    }
}
