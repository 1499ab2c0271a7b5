//! JSON-RPC transport over a CDP websocket endpoint.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::sync::{broadcast, oneshot, Mutex};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, warn};

use crate::error::{CdpError, CdpResult};

/// A raw `{method, params}` notification, fanned out to every subscriber
/// regardless of which page/session it concerns — callers filter.
#[derive(Clone, Debug)]
pub struct RawNotification {
    pub session_id: Option<String>,
    pub method: String,
    pub params: Value,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, session_id: Option<&str>, method: &str, params: Value) -> CdpResult<Value>;
    fn subscribe(&self) -> broadcast::Receiver<RawNotification>;
}

/// Transport that fails every command; used when no real Chrome endpoint is
/// available (tests, or a host that hasn't wired a CDP connection yet).
pub struct NoopTransport {
    events: broadcast::Sender<RawNotification>,
}

impl Default for NoopTransport {
    fn default() -> Self {
        let (events, _) = broadcast::channel(16);
        Self { events }
    }
}

#[async_trait]
impl Transport for NoopTransport {
    async fn send(&self, _session_id: Option<&str>, method: &str, _params: Value) -> CdpResult<Value> {
        Err(CdpError::Transport(format!("no CDP connection attached ({method})")))
    }

    fn subscribe(&self) -> broadcast::Receiver<RawNotification> {
        self.events.subscribe()
    }
}

struct Pending {
    sender: oneshot::Sender<CdpResult<Value>>,
}

/// Real transport: one websocket connection to a page's CDP debugger URL,
/// JSON-RPC request ids correlated via a pending-call table, notifications
/// fanned out on a broadcast channel.
pub struct WsTransport {
    next_id: AtomicU64,
    pending: DashMap<u64, Pending>,
    writer: Mutex<futures_util::stream::SplitSink<
        tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
        WsMessage,
    >>,
    events: broadcast::Sender<RawNotification>,
}

impl WsTransport {
    pub async fn connect(ws_url: &str) -> CdpResult<Arc<Self>> {
        let (stream, _) = tokio_tungstenite::connect_async(ws_url)
            .await
            .map_err(|err| CdpError::Transport(format!("websocket connect failed: {err}")))?;
        let (writer, mut reader) = stream.split();
        let (events, _) = broadcast::channel(1024);

        let transport = Arc::new(Self {
            next_id: AtomicU64::new(1),
            pending: DashMap::new(),
            writer: Mutex::new(writer),
            events,
        });

        let weak = Arc::downgrade(&transport);
        tokio::spawn(async move {
            while let Some(msg) = reader.next().await {
                let Ok(msg) = msg else { break };
                let WsMessage::Text(text) = msg else { continue };
                let Some(transport) = weak.upgrade() else { break };
                transport.dispatch(&text);
            }
            debug!("cdp websocket reader task exiting");
        });

        Ok(transport)
    }

    fn dispatch(&self, text: &str) {
        let Ok(value) = serde_json::from_str::<Value>(text) else {
            warn!(raw = text, "cdp message was not valid JSON");
            return;
        };
        if let Some(id) = value.get("id").and_then(Value::as_u64) {
            if let Some((_, pending)) = self.pending.remove(&id) {
                let result = match value.get("error") {
                    Some(err) => Err(CdpError::CommandFailed {
                        method: format!("id={id}"),
                        message: err.get("message").and_then(Value::as_str).unwrap_or("unknown").to_string(),
                    }),
                    None => Ok(value.get("result").cloned().unwrap_or(Value::Null)),
                };
                let _ = pending.sender.send(result);
            }
            return;
        }
        if let Some(method) = value.get("method").and_then(Value::as_str) {
            let notification = RawNotification {
                session_id: value.get("sessionId").and_then(Value::as_str).map(str::to_string),
                method: method.to_string(),
                params: value.get("params").cloned().unwrap_or(Value::Null),
            };
            let _ = self.events.send(notification);
        }
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&self, session_id: Option<&str>, method: &str, params: Value) -> CdpResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.insert(id, Pending { sender: tx });

        let mut envelope = json!({ "id": id, "method": method, "params": params });
        if let Some(session_id) = session_id {
            envelope["sessionId"] = Value::String(session_id.to_string());
        }

        {
            let mut writer = self.writer.lock().await;
            writer
                .send(WsMessage::Text(envelope.to_string()))
                .await
                .map_err(|err| CdpError::Transport(err.to_string()))?;
        }

        tokio::time::timeout(Duration::from_secs(30), rx)
            .await
            .map_err(|_| CdpError::Timeout(method.to_string()))?
            .map_err(|_| CdpError::Transport("command channel closed".to_string()))?
    }

    fn subscribe(&self) -> broadcast::Receiver<RawNotification> {
        self.events.subscribe()
    }
}

/// Discover the page-level websocket debugger URL via the browser's
/// `/json/list` HTTP endpoint (the standard remote-debugging discovery
/// protocol every Chromium target exposes alongside CDP itself).
pub async fn discover_page_ws_url(http_endpoint: &str, target_url_contains: &str) -> CdpResult<String> {
    let list_url = format!("{}/json/list", http_endpoint.trim_end_matches('/'));
    let targets: Vec<HashMap<String, Value>> = reqwest::get(&list_url)
        .await
        .map_err(|err| CdpError::Transport(format!("failed to list targets: {err}")))?
        .json()
        .await
        .map_err(|err| CdpError::Transport(format!("failed to decode target list: {err}")))?;

    targets
        .into_iter()
        .find(|t| {
            t.get("url")
                .and_then(Value::as_str)
                .map(|u| u.contains(target_url_contains))
                .unwrap_or(false)
        })
        .and_then(|t| t.get("webSocketDebuggerUrl").and_then(Value::as_str).map(str::to_string))
        .ok_or_else(|| CdpError::Transport("no matching target found".to_string()))
}
