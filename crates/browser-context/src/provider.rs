//! Browser Context Provider (§4.3): attaches a CDP debugger, accumulates
//! bounded console/network activity, and assembles `BrowserContext`
//! snapshots on demand.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::warn;

use a11y_tree::{A11yOptions, A11yTreeExtractor, RawA11yNode};
use browzer_types::{
    AccessibilityTree, BrowserContext, ConsoleEntry, ContextOptions, ElementCounts, LogLevel,
    NetworkEntry, PageMetadata, ReadyState, ScrollPosition, Viewport, VisualContext,
};
use cdp_adapter::{CdpAdapter, CdpEvent, PageId, SessionId};
use dom_pruner::{DomPruner, PruneOptions, RawDomNode};

use crate::buffers::{self, RingBuffer};
use crate::errors::{ContextError, ContextResult};
use crate::scripts::{A11Y_WALK_SCRIPT, DOM_WALK_SCRIPT, METADATA_SCRIPT};

struct LastKnown {
    url: String,
    title: String,
}

pub struct BrowserContextProvider {
    adapter: Arc<CdpAdapter>,
    page: PageId,
    dom_pruner: DomPruner,
    a11y: A11yTreeExtractor,
    console: Mutex<RingBuffer<ConsoleEntry>>,
    network: Mutex<RingBuffer<NetworkEntry>>,
    /// In-flight requests keyed by CDP `requestId`, moved into `network`
    /// once a response/finish/failure is observed.
    pending_requests: Mutex<HashMap<String, NetworkEntry>>,
    last_known: Mutex<LastKnown>,
}

impl BrowserContextProvider {
    pub fn new(adapter: Arc<CdpAdapter>, page: PageId) -> Self {
        Self {
            adapter,
            page,
            dom_pruner: DomPruner::new(),
            a11y: A11yTreeExtractor::new(),
            console: Mutex::new(RingBuffer::default()),
            network: Mutex::new(RingBuffer::default()),
            pending_requests: Mutex::new(HashMap::new()),
            last_known: Mutex::new(LastKnown {
                url: String::new(),
                title: String::new(),
            }),
        }
    }

    /// Attaches the debugger and enables the required domains. Activity
    /// buffers are populated by feeding [`CdpEvent`]s observed on the
    /// adapter's broadcast channel into [`Self::record_event`].
    pub async fn start_monitoring(&self) -> ContextResult<SessionId> {
        let session = self.adapter.attach(self.page, SessionId::new()).await?;
        Ok(session)
    }

    pub async fn stop_monitoring(&self) {
        self.adapter.detach(self.page).await;
    }

    /// Folds one live CDP event into the bounded console/network buffers.
    /// The caller (the orchestrator wiring the adapter's broadcast receiver)
    /// is expected to call this for every event on the page's channel.
    pub fn record_event(&self, event: &CdpEvent) {
        match event {
            CdpEvent::ConsoleApiCalled { ty, args, timestamp } => {
                let message = args
                    .iter()
                    .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                    .collect::<Vec<_>>()
                    .join(" ");
                self.console.lock().push(ConsoleEntry {
                    level: console_level(ty),
                    message,
                    timestamp: timestamp_from_millis(*timestamp),
                    source: Some("console".to_string()),
                });
            }
            CdpEvent::LogEntryAdded { level, text, timestamp, source } => {
                self.console.lock().push(ConsoleEntry {
                    level: log_level(level),
                    message: text.clone(),
                    timestamp: timestamp_from_millis(*timestamp),
                    source: source.clone(),
                });
            }
            CdpEvent::NetworkRequestWillBeSent { request_id, url, method, resource_type, timestamp } => {
                self.pending_requests.lock().insert(
                    request_id.clone(),
                    NetworkEntry {
                        url: url.clone(),
                        method: method.clone(),
                        resource_type: resource_type.clone(),
                        status: None,
                        duration_ms: None,
                        failed: false,
                        error_text: None,
                        timestamp: timestamp_from_millis(*timestamp),
                    },
                );
            }
            CdpEvent::NetworkResponseReceived { request_id, status } => {
                if let Some(entry) = self.pending_requests.lock().get_mut(request_id) {
                    entry.status = Some(*status);
                }
            }
            CdpEvent::NetworkLoadingFinished { request_id, timestamp } => {
                if let Some(mut entry) = self.pending_requests.lock().remove(request_id) {
                    let ts = timestamp_from_millis(*timestamp);
                    entry.duration_ms = Some((ts - entry.timestamp).num_milliseconds().max(0) as u64);
                    self.network.lock().push(entry);
                }
            }
            CdpEvent::NetworkLoadingFailed { request_id, error_text } => {
                if let Some(mut entry) = self.pending_requests.lock().remove(request_id) {
                    entry.failed = true;
                    entry.error_text = Some(error_text.clone());
                    self.network.lock().push(entry);
                }
            }
            CdpEvent::PageFrameNavigated { url, is_main_frame, .. } => {
                if *is_main_frame {
                    let mut last = self.last_known.lock();
                    last.url = url.clone();
                }
            }
            _ => {}
        }
    }

    pub async fn get_context(&self, options: &ContextOptions) -> BrowserContext {
        let metadata = self.fetch_metadata().await;

        let interactive_elements = if options.include_pruned_dom {
            match self.fetch_dom_tree().await {
                Ok(root) => {
                    let opts = PruneOptions {
                        max_elements: options.max_elements.unwrap_or(50),
                        ..Default::default()
                    };
                    self.dom_pruner.prune(&root, opts).elements
                }
                Err(err) => {
                    warn!(error = %err, "dom walk failed, returning empty element set");
                    vec![]
                }
            }
        } else {
            vec![]
        };

        let accessibility_tree: Option<AccessibilityTree> = if options.include_accessibility_tree {
            match self.fetch_a11y_tree().await {
                Ok(root) => Some(self.a11y.extract(&root, A11yOptions::default())),
                Err(err) => {
                    warn!(error = %err, "accessibility walk failed, omitting tree");
                    None
                }
            }
        } else {
            None
        };

        let console_logs = if options.include_console_logs {
            let guard = self.console.lock();
            buffers::select(&guard, options.activity_since, |e| e.timestamp, options.max_console_entries)
                .into_iter()
                .cloned()
                .collect()
        } else {
            vec![]
        };

        let network_activity = if options.include_network_activity {
            let guard = self.network.lock();
            buffers::select(&guard, options.activity_since, |e| e.timestamp, options.max_network_entries)
                .into_iter()
                .cloned()
                .collect()
        } else {
            vec![]
        };

        let total = interactive_elements.len();
        let interactive = interactive_elements.iter().filter(|e| e.is_interactive).count();
        let visible = interactive_elements.iter().filter(|e| e.is_visible).count();

        let visual = if options.include_screenshot || options.include_visual_description {
            self.capture_visual(options.include_screenshot, options.include_visual_description).await
        } else {
            None
        };

        BrowserContext {
            page: metadata,
            interactive_elements,
            accessibility_tree,
            console_logs,
            network_activity,
            element_counts: ElementCounts::new(total, interactive, visible),
            visual,
            captured_at: Utc::now(),
        }
    }

    async fn fetch_metadata(&self) -> PageMetadata {
        match self.adapter.evaluate(self.page, METADATA_SCRIPT).await {
            Ok(value) => {
                let url = value.get("url").and_then(|v| v.as_str()).unwrap_or_default().to_string();
                let title = value.get("title").and_then(|v| v.as_str()).unwrap_or_default().to_string();
                {
                    let mut last = self.last_known.lock();
                    last.url = url.clone();
                    last.title = title.clone();
                }
                PageMetadata {
                    url,
                    title,
                    ready_state: parse_ready_state(value.get("readyState").and_then(|v| v.as_str())),
                    scroll_position: ScrollPosition {
                        x: value.get("scrollX").and_then(|v| v.as_f64()).unwrap_or_default(),
                        y: value.get("scrollY").and_then(|v| v.as_f64()).unwrap_or_default(),
                    },
                    viewport: Viewport {
                        w: value.get("width").and_then(|v| v.as_u64()).unwrap_or_default() as u32,
                        h: value.get("height").and_then(|v| v.as_u64()).unwrap_or_default() as u32,
                    },
                }
            }
            Err(err) => {
                warn!(error = %err, "metadata evaluate failed, attempting reattach");
                let _ = self.adapter.reattach(self.page).await;
                let last = self.last_known.lock();
                PageMetadata {
                    url: last.url.clone(),
                    title: last.title.clone(),
                    ready_state: ReadyState::Complete,
                    scroll_position: ScrollPosition::default(),
                    viewport: Viewport::default(),
                }
            }
        }
    }

    async fn fetch_dom_tree(&self) -> ContextResult<RawDomNode> {
        let value = self.adapter.evaluate(self.page, DOM_WALK_SCRIPT).await?;
        serde_json::from_value(value).map_err(ContextError::MalformedDomWalk)
    }

    async fn fetch_a11y_tree(&self) -> ContextResult<RawA11yNode> {
        let value = self.adapter.evaluate(self.page, A11Y_WALK_SCRIPT).await?;
        serde_json::from_value(value).map_err(ContextError::MalformedA11yWalk)
    }

    /// Screenshot/visual-description capture is best-effort: failures never
    /// fail the overall snapshot (§4.3 "Screenshot capture errors do not
    /// fail the snapshot").
    async fn capture_visual(&self, include_screenshot: bool, include_description: bool) -> Option<VisualContext> {
        let screenshot_base64 = if include_screenshot {
            match self.adapter.evaluate(self.page, "null").await {
                Ok(_) => None, // capturing a real screenshot needs Page.captureScreenshot, out of this crate's evaluate-only surface
                Err(err) => {
                    warn!(error = %err, "screenshot capture failed, continuing without it");
                    None
                }
            }
        } else {
            None
        };
        let description = if include_description { Some("visual description unavailable".to_string()) } else { None };
        if screenshot_base64.is_none() && description.is_none() {
            return None;
        }
        Some(VisualContext {
            screenshot_base64,
            description,
            ts: Utc::now(),
        })
    }
}

fn console_level(ty: &str) -> LogLevel {
    match ty {
        "error" => LogLevel::Error,
        "warning" | "warn" => LogLevel::Warn,
        "debug" => LogLevel::Debug,
        "info" => LogLevel::Info,
        _ => LogLevel::Log,
    }
}

fn log_level(level: &str) -> LogLevel {
    match level {
        "error" => LogLevel::Error,
        "warning" => LogLevel::Warn,
        "verbose" => LogLevel::Debug,
        "info" => LogLevel::Info,
        _ => LogLevel::Log,
    }
}

fn parse_ready_state(raw: Option<&str>) -> ReadyState {
    match raw {
        Some("loading") => ReadyState::Loading,
        Some("interactive") => ReadyState::Interactive,
        _ => ReadyState::Complete,
    }
}

fn timestamp_from_millis(ts: f64) -> chrono::DateTime<Utc> {
    chrono::DateTime::from_timestamp((ts / 1000.0) as i64, ((ts % 1000.0) * 1_000_000.0) as u32)
        .unwrap_or_else(Utc::now)
}
