//! The CDP domains, commands and events this adapter speaks (§6).
//!
//! Domains enabled on every attach: `DOM`, `Page` (with
//! `Page.setLifecycleEventsEnabled`), `Runtime`, `Network`, `Log`, `Console`.

use serde_json::{json, Value};

pub const ENABLE_COMMANDS: &[(&str, &str)] = &[
    ("DOM.enable", "DOM"),
    ("Page.enable", "Page"),
    ("Runtime.enable", "Runtime"),
    ("Network.enable", "Network"),
    ("Log.enable", "Log"),
];

pub fn set_lifecycle_events_enabled_params() -> Value {
    json!({ "enabled": true })
}

pub fn get_document_params() -> Value {
    json!({ "depth": -1, "pierce": true })
}

pub fn add_script_to_evaluate_on_new_document_params(source: &str) -> Value {
    json!({ "source": source })
}

pub fn evaluate_params(expression: &str, await_promise: bool) -> Value {
    json!({
        "expression": expression,
        "returnByValue": true,
        "awaitPromise": await_promise,
    })
}

/// An event fanned out from `Runtime.consoleAPICalled`, `Log.entryAdded`,
/// `Network.*`, `Page.frameNavigated`, `Page.lifecycleEvent` or
/// `Page.loadEventFired` (§6 events consumed).
#[derive(Clone, Debug)]
pub enum CdpEvent {
    ConsoleApiCalled { ty: String, args: Vec<Value>, timestamp: f64 },
    LogEntryAdded { level: String, text: String, timestamp: f64, source: Option<String> },
    NetworkRequestWillBeSent { request_id: String, url: String, method: String, resource_type: String, timestamp: f64 },
    NetworkResponseReceived { request_id: String, status: u16 },
    NetworkLoadingFinished { request_id: String, timestamp: f64 },
    NetworkLoadingFailed { request_id: String, error_text: String },
    PageFrameNavigated { frame_id: String, url: String, is_main_frame: bool },
    PageLifecycleNetworkIdle,
    PageLoadEventFired,
    Other { method: String, params: Value },
}

/// Parse a raw `{method, params}` notification into a typed [`CdpEvent`].
pub fn parse_event(method: &str, params: &Value) -> CdpEvent {
    match method {
        "Runtime.consoleAPICalled" => CdpEvent::ConsoleApiCalled {
            ty: params.get("type").and_then(Value::as_str).unwrap_or("log").to_string(),
            args: params.get("args").and_then(Value::as_array).cloned().unwrap_or_default(),
            timestamp: params.get("timestamp").and_then(Value::as_f64).unwrap_or_default(),
        },
        "Log.entryAdded" => {
            let entry = params.get("entry").cloned().unwrap_or_default();
            CdpEvent::LogEntryAdded {
                level: entry.get("level").and_then(Value::as_str).unwrap_or("info").to_string(),
                text: entry.get("text").and_then(Value::as_str).unwrap_or_default().to_string(),
                timestamp: entry.get("timestamp").and_then(Value::as_f64).unwrap_or_default(),
                source: entry.get("source").and_then(Value::as_str).map(str::to_string),
            }
        }
        "Network.requestWillBeSent" => CdpEvent::NetworkRequestWillBeSent {
            request_id: params.get("requestId").and_then(Value::as_str).unwrap_or_default().to_string(),
            url: params.pointer("/request/url").and_then(Value::as_str).unwrap_or_default().to_string(),
            method: params.pointer("/request/method").and_then(Value::as_str).unwrap_or("GET").to_string(),
            resource_type: params.get("type").and_then(Value::as_str).unwrap_or("Other").to_string(),
            timestamp: params.get("timestamp").and_then(Value::as_f64).unwrap_or_default(),
        },
        "Network.responseReceived" => CdpEvent::NetworkResponseReceived {
            request_id: params.get("requestId").and_then(Value::as_str).unwrap_or_default().to_string(),
            status: params.pointer("/response/status").and_then(Value::as_u64).unwrap_or(0) as u16,
        },
        "Network.loadingFinished" => CdpEvent::NetworkLoadingFinished {
            request_id: params.get("requestId").and_then(Value::as_str).unwrap_or_default().to_string(),
            timestamp: params.get("timestamp").and_then(Value::as_f64).unwrap_or_default(),
        },
        "Network.loadingFailed" => CdpEvent::NetworkLoadingFailed {
            request_id: params.get("requestId").and_then(Value::as_str).unwrap_or_default().to_string(),
            error_text: params.get("errorText").and_then(Value::as_str).unwrap_or("unknown").to_string(),
        },
        "Page.frameNavigated" => CdpEvent::PageFrameNavigated {
            frame_id: params.pointer("/frame/id").and_then(Value::as_str).unwrap_or_default().to_string(),
            url: params.pointer("/frame/url").and_then(Value::as_str).unwrap_or_default().to_string(),
            is_main_frame: params.pointer("/frame/parentId").is_none(),
        },
        "Page.lifecycleEvent" if params.get("name").and_then(Value::as_str) == Some("networkIdle") => {
            CdpEvent::PageLifecycleNetworkIdle
        }
        "Page.loadEventFired" => CdpEvent::PageLoadEventFired,
        other => CdpEvent::Other { method: other.to_string(), params: params.clone() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_network_idle_lifecycle_event_only() {
        let idle = parse_event("Page.lifecycleEvent", &json!({"name": "networkIdle"}));
        assert!(matches!(idle, CdpEvent::PageLifecycleNetworkIdle));

        let other = parse_event("Page.lifecycleEvent", &json!({"name": "load"}));
        assert!(matches!(other, CdpEvent::Other { .. }));
    }

    #[test]
    fn parses_console_api_called() {
        let event = parse_event(
            "Runtime.consoleAPICalled",
            &json!({"type": "info", "args": [{"value": "[BROWZER_ACTION]"}], "timestamp": 1.0}),
        );
        match event {
            CdpEvent::ConsoleApiCalled { ty, args, .. } => {
                assert_eq!(ty, "info");
                assert_eq!(args.len(), 1);
            }
            _ => panic!("wrong variant"),
        }
    }
}
