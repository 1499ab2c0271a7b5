//! Input tree for accessibility extraction (§4.2).
//!
//! Like `dom-pruner`'s `RawDomNode`, `RawA11yNode` is assembled by
//! `browser-context` from a single CDP DOM walk. Reference-based accessible
//! name sources (`aria-labelledby`, `<label for>`) require whole-document id
//! lookups, so the caller resolves those once up front and hands the result
//! in as plain text rather than this crate re-walking the document.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawA11yAttributes {
    pub id: Option<String>,
    pub role: Option<String>,
    pub aria_label: Option<String>,
    /// Text resolved by the caller from whatever element `aria-labelledby` points to.
    pub aria_labelledby_text: Option<String>,
    /// Text resolved by the caller from a `<label for="...">` targeting this node.
    pub label_text: Option<String>,
    /// Text resolved by the caller from whatever element `aria-describedby` points to.
    pub aria_describedby_text: Option<String>,
    pub placeholder: Option<String>,
    pub alt: Option<String>,
    pub title: Option<String>,
    pub href: Option<String>,
    pub element_type: Option<String>,
    pub value: Option<String>,
    pub disabled: bool,
    pub focused: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawA11yNode {
    pub tag: String,
    pub attributes: RawA11yAttributes,
    pub text: String,
    pub hidden: bool,
    pub children: Vec<RawA11yNode>,
}

impl RawA11yNode {
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_attributes(mut self, attrs: RawA11yAttributes) -> Self {
        self.attributes = attrs;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_children(mut self, children: Vec<RawA11yNode>) -> Self {
        self.children = children;
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }
}
