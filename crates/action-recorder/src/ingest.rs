//! Parses `console.info('[BROWZER_ACTION]', json)` payloads arriving via
//! `Runtime.consoleAPICalled` into the raw JSON shape the tracker script
//! emits (§4.4).

use serde::Deserialize;
use serde_json::Value;

pub const MARKER: &str = "[BROWZER_ACTION]";

#[derive(Debug, Deserialize)]
pub struct RawCapturedEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub timestamp: f64,
    #[serde(default)]
    pub target: Option<RawTarget>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub position: Option<RawPosition>,
    #[serde(default)]
    pub metadata: Value,
    #[serde(rename = "preState", default)]
    pub pre_state: Option<RawPreState>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawTarget {
    #[serde(rename = "tagName")]
    pub tag_name: String,
    pub text: Option<String>,
    #[serde(rename = "ariaLabel")]
    pub aria_label: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawPosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Deserialize)]
pub struct RawPreState {
    pub url: String,
    #[serde(rename = "scrollX")]
    pub scroll_x: f64,
    #[serde(rename = "scrollY")]
    pub scroll_y: f64,
    #[serde(rename = "activeTag")]
    pub active_tag: Option<String>,
    #[serde(rename = "modalCount")]
    pub modal_count: usize,
}

/// If `args` is the two-element `['[BROWZER_ACTION]', json]` pair the
/// tracker script emits, parses and returns the payload. Malformed payloads
/// are logged and dropped by the caller (§4.4 failure semantics), not here.
pub fn parse_marker_args(args: &[Value]) -> Option<Result<RawCapturedEvent, serde_json::Error>> {
    let first = args.first()?.get("value").and_then(Value::as_str)?;
    if first != MARKER {
        return None;
    }
    let raw = args.get(1)?.get("value").and_then(Value::as_str)?;
    Some(serde_json::from_str(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn recognizes_marker_and_parses_payload() {
        let payload = json!({"type": "click", "timestamp": 123.0});
        let args = vec![
            json!({"type": "string", "value": MARKER}),
            json!({"type": "string", "value": payload.to_string()}),
        ];
        let parsed = parse_marker_args(&args).unwrap().unwrap();
        assert_eq!(parsed.event_type, "click");
    }

    #[test]
    fn ignores_non_marker_console_calls() {
        let args = vec![json!({"type": "string", "value": "some unrelated log"})];
        assert!(parse_marker_args(&args).is_none());
    }
}
