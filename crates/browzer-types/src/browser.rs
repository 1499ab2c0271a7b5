//! Browser-facing data model: pruned DOM elements, accessibility nodes,
//! console/network entries, the assembled `BrowserContext`, and recorded
//! user actions (§3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One selector candidate with its confidence score (§4.1 selector
/// strategies, listed in priority order by the DOM Pruner).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SelectorCandidate {
    pub strategy: SelectorStrategy,
    pub value: String,
    pub confidence: u8,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SelectorStrategy {
    Id,
    TestId,
    DataCy,
    AriaLabel,
    RoleName,
    TagText,
    CssPath,
    XPath,
}

/// A pruned DOM node: tag, multi-strategy selector set, bounding rect,
/// attributes and a truncated text snippet. Immutable once captured.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct InteractiveElement {
    pub tag: String,
    pub selectors: Vec<SelectorCandidate>,
    pub best_selector: SelectorCandidate,
    pub rect: BoundingRect,
    pub attributes: ElementAttributes,
    /// Text content truncated to at most 100 characters.
    pub text: String,
    pub is_visible: bool,
    pub is_interactive: bool,
    pub interactivity_score: u8,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct BoundingRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingRect {
    pub fn is_zero(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ElementAttributes {
    pub id: Option<String>,
    pub class: Option<String>,
    pub role: Option<String>,
    pub aria_label: Option<String>,
    pub placeholder: Option<String>,
    pub value: Option<String>,
    pub href: Option<String>,
    pub test_id: Option<String>,
}

/// `{url, title, readyState, scrollPosition:{x,y}, viewport:{w,h}}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PageMetadata {
    pub url: String,
    pub title: String,
    pub ready_state: ReadyState,
    pub scroll_position: ScrollPosition,
    pub viewport: Viewport,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ScrollPosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Viewport {
    pub w: u32,
    pub h: u32,
}

/// `{role, name?, description?, value?, focused?, disabled?, children?[]}`.
/// Only nodes with a resolvable semantic role are included.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AccessibilityNode {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focused: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AccessibilityNode>,
}

/// Result of the accessibility tree extractor: `{tree, nodeCount, truncated}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AccessibilityTree {
    pub tree: Option<AccessibilityNode>,
    pub node_count: usize,
    pub truncated: bool,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Log,
    Info,
    Warn,
    Error,
    Debug,
}

/// `{level, message, timestamp, source?}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ConsoleEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// `{url, method, type, status?, duration?, failed?, errorText?, timestamp}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NetworkEntry {
    pub url: String,
    pub method: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_text: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Element counts tracked on every `BrowserContext`: `interactive ≤ total`
/// and `visible ≤ total` is an enforced invariant (§8).
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ElementCounts {
    pub total: usize,
    pub interactive: usize,
    pub visible: usize,
}

impl ElementCounts {
    pub fn new(total: usize, interactive: usize, visible: usize) -> Self {
        let interactive = interactive.min(total);
        let visible = visible.min(total);
        Self {
            total,
            interactive,
            visible,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VisualContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub ts: DateTime<Utc>,
}

/// Bundle of pruned DOM, accessibility tree, console/network buffers,
/// counts, optional visual context and capture time (§3 `Browser Context`).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BrowserContext {
    pub page: PageMetadata,
    #[serde(default)]
    pub interactive_elements: Vec<InteractiveElement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessibility_tree: Option<AccessibilityTree>,
    #[serde(default)]
    pub console_logs: Vec<ConsoleEntry>,
    #[serde(default)]
    pub network_activity: Vec<NetworkEntry>,
    pub element_counts: ElementCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual: Option<VisualContext>,
    pub captured_at: DateTime<Utc>,
}

/// Options accepted by `getContext` (§4.3).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ContextOptions {
    #[serde(default)]
    pub include_pruned_dom: bool,
    #[serde(default)]
    pub include_accessibility_tree: bool,
    #[serde(default)]
    pub include_console_logs: bool,
    #[serde(default)]
    pub include_network_activity: bool,
    #[serde(default)]
    pub include_screenshot: bool,
    #[serde(default)]
    pub include_visual_description: bool,
    pub max_elements: Option<usize>,
    pub max_console_entries: Option<usize>,
    pub max_network_entries: Option<usize>,
    pub activity_since: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RecordedActionType {
    Click,
    Input,
    Checkbox,
    Radio,
    Select,
    FileUpload,
    Submit,
    Keypress,
    Navigate,
}

/// A target element reference attached to a recorded action.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ElementTarget {
    pub tag_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct NetworkEffect {
    pub request_count: usize,
    #[serde(default)]
    pub urls: Vec<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct FocusEffect {
    pub new_focus_tag_name: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ScrollEffect {
    pub delta_x: f64,
    pub delta_y: f64,
}

/// Populated only after verification completes (§3, §4.4).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ActionEffects {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkEffect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<FocusEffect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll: Option<ScrollEffect>,
}

impl ActionEffects {
    pub const NO_SIGNIFICANT_EFFECTS: &'static str = "no significant effects detected";

    pub fn none() -> Self {
        Self {
            summary: Self::NO_SIGNIFICANT_EFFECTS.to_string(),
            network: None,
            focus: None,
            scroll: None,
        }
    }
}

/// `{type, timestamp, target?, value?, position?, metadata?, verified,
/// verificationTime?, effects?}` (§3).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RecordedAction {
    #[serde(rename = "type")]
    pub action_type: RecordedActionType,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<ElementTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<BoundingRect>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effects: Option<ActionEffects>,
}

impl RecordedAction {
    pub fn new(action_type: RecordedActionType, timestamp: DateTime<Utc>) -> Self {
        Self {
            action_type,
            timestamp,
            target: None,
            value: None,
            position: None,
            metadata: serde_json::Value::Null,
            verified: false,
            verification_time_ms: None,
            effects: None,
        }
    }

    /// Stable key into the recorder's pending-actions map: `${type}-${timestamp}`.
    pub fn pending_key(action_type: RecordedActionType, timestamp: DateTime<Utc>) -> String {
        format!("{:?}-{}", action_type, timestamp.timestamp_millis()).to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_counts_clamp_to_total() {
        let counts = ElementCounts::new(5, 9, 7);
        assert_eq!(counts.interactive, 5);
        assert_eq!(counts.visible, 5);
    }

    #[test]
    fn default_action_effects_report_no_effects() {
        let effects = ActionEffects::none();
        assert_eq!(effects.summary, "no significant effects detected");
        assert!(effects.network.is_none());
    }

    #[test]
    fn bounding_rect_zero_detection() {
        assert!(BoundingRect::default().is_zero());
        assert!(!BoundingRect {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0
        }
        .is_zero());
    }
}
