use serde::{Deserialize, Serialize};

/// Adapter configuration. A real deployment points `http_endpoint` at a
/// running Chrome's `--remote-debugging-port`; `discover_page_ws_url`
/// resolves the per-page websocket URL from there.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CdpConfig {
    pub http_endpoint: String,
    pub command_timeout_ms: u64,
}

impl Default for CdpConfig {
    fn default() -> Self {
        Self {
            http_endpoint: "http://127.0.0.1:9222".to_string(),
            command_timeout_ms: 30_000,
        }
    }
}
