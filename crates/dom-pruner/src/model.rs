//! Input tree the pruner scans (§4.1).
//!
//! `RawDomNode` is assembled by `browser-context` from CDP's
//! `DOM.getDocument`/`CSS.getComputedStyleForNode` (or, equivalently, a
//! single `Runtime.evaluate` DOM walk) before being handed to [`crate::prune`].
//! Keeping this as a plain data structure rather than talking CDP directly
//! keeps the scoring algorithm itself pure and unit-testable.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ComputedStyle {
    pub display: Option<String>,
    pub visibility: Option<String>,
    pub opacity: Option<f64>,
    pub cursor: Option<String>,
}

impl ComputedStyle {
    pub fn is_hidden(&self) -> bool {
        self.display.as_deref() == Some("none")
            || self.visibility.as_deref() == Some("hidden")
            || self.opacity == Some(0.0)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RawRect {
    pub fn is_zero(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawAttributes {
    pub id: Option<String>,
    pub class: Option<String>,
    pub role: Option<String>,
    pub aria_label: Option<String>,
    pub aria_describedby: Option<String>,
    pub placeholder: Option<String>,
    pub value: Option<String>,
    pub href: Option<String>,
    pub test_id: Option<String>,
    pub cy_id: Option<String>,
    pub tabindex: Option<i32>,
    pub element_type: Option<String>,
    pub has_onclick: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawDomNode {
    pub tag: String,
    pub attributes: RawAttributes,
    pub style: ComputedStyle,
    pub rect: RawRect,
    pub text: String,
    pub children: Vec<RawDomNode>,
}

impl RawDomNode {
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_attributes(mut self, attrs: RawAttributes) -> Self {
        self.attributes = attrs;
        self
    }

    pub fn with_rect(mut self, rect: RawRect) -> Self {
        self.rect = rect;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_children(mut self, children: Vec<RawDomNode>) -> Self {
        self.children = children;
        self
    }
}
