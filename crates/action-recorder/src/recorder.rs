//! Action Recorder & Verifier (§4.4).

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::Duration;
use tracing::{info, warn};

use browzer_types::{BoundingRect, ElementTarget, RecordedAction, RecordedActionType};
use cdp_adapter::{CdpAdapter, CdpEvent, PageId, SessionId};

use crate::classify::is_recordable_navigation;
use crate::errors::RecorderResult;
use crate::ingest::{parse_marker_args, RawCapturedEvent, RawPreState, RawTarget};
use crate::redact::redact_form_data;
use crate::script::TRACKER_SCRIPT;
use crate::verify::{self, ObservedRequest, PostActionState};

const FINALIZE_DELAY_MS: u64 = 500;
const POST_STATE_SCRIPT: &str = r#"(() => ({
  url: location.href,
  scrollX: window.scrollX,
  scrollY: window.scrollY,
  activeTag: document.activeElement ? document.activeElement.tagName : null,
  modalCount: document.querySelectorAll('[role="dialog"], [role="alertdialog"], .modal.show, .modal.open').length,
}))()"#;

struct PendingAction {
    action: RecordedAction,
    pre_state: Option<RawPreState>,
    notify: Arc<Notify>,
}

pub struct ActionRecorder {
    adapter: Arc<CdpAdapter>,
    page: PageId,
    active: Mutex<bool>,
    pending: DashMap<String, PendingAction>,
    recorded: Mutex<Vec<RecordedAction>>,
    recent_requests: Mutex<Vec<ObservedRequest>>,
}

impl ActionRecorder {
    pub fn new(adapter: Arc<CdpAdapter>, page: PageId) -> Arc<Self> {
        Arc::new(Self {
            adapter,
            page,
            active: Mutex::new(false),
            pending: DashMap::new(),
            recorded: Mutex::new(Vec::new()),
            recent_requests: Mutex::new(Vec::new()),
        })
    }

    pub async fn start_recording(self: &Arc<Self>, session: Option<SessionId>) -> RecorderResult<()> {
        self.adapter.attach(self.page, session.unwrap_or_else(SessionId::new)).await?;
        self.inject_tracker().await?;
        *self.active.lock() = true;
        Ok(())
    }

    pub fn stop_recording(&self) -> Vec<RecordedAction> {
        *self.active.lock() = false;
        let mut actions = self.recorded.lock().clone();
        actions.sort_by_key(|a| a.timestamp);
        actions
    }

    pub fn is_active(&self) -> bool {
        *self.active.lock()
    }

    #[cfg(test)]
    pub fn test_set_active(&self) -> parking_lot::MutexGuard<'_, bool> {
        self.active.lock()
    }

    async fn inject_tracker(&self) -> RecorderResult<()> {
        // Installed for future navigations...
        let _ = self
            .adapter
            .evaluate(self.page, &format!("void ({TRACKER_SCRIPT})"))
            .await;
        Ok(())
    }

    /// Feeds one live CDP event into the recorder. Console events carrying
    /// the `[BROWZER_ACTION]` marker become pending actions; network events
    /// feed the verification window; navigation and load events are handled
    /// per §4.4's "Navigation" rules.
    pub fn record_event(self: &Arc<Self>, event: &CdpEvent) {
        if !self.is_active() {
            return;
        }
        match event {
            CdpEvent::ConsoleApiCalled { args, .. } => {
                if let Some(parsed) = parse_marker_args(args) {
                    match parsed {
                        Ok(raw) => self.ingest_captured_event(raw),
                        Err(err) => warn!(error = %err, "dropping malformed [BROWZER_ACTION] payload"),
                    }
                }
            }
            CdpEvent::NetworkRequestWillBeSent { url, method, resource_type, timestamp, .. } => {
                let mut guard = self.recent_requests.lock();
                guard.push(ObservedRequest {
                    url: url.clone(),
                    method: method.clone(),
                    resource_type: resource_type.clone(),
                    timestamp: timestamp_from_millis(*timestamp),
                });
                if guard.len() > 500 {
                    let excess = guard.len() - 500;
                    guard.drain(0..excess);
                }
            }
            CdpEvent::PageFrameNavigated { url, is_main_frame, .. } => {
                if *is_main_frame && is_recordable_navigation(url) {
                    let mut action = RecordedAction::new(RecordedActionType::Navigate, Utc::now());
                    action.value = Some(url.clone());
                    action.verified = true;
                    action.verification_time_ms = Some(0);
                    self.recorded.lock().push(action);
                }
            }
            CdpEvent::PageLoadEventFired => {
                let this = Arc::clone(self);
                tokio::spawn(async move {
                    let _ = this.inject_tracker().await;
                });
            }
            CdpEvent::PageLifecycleNetworkIdle => {
                for entry in self.pending.iter() {
                    entry.value().notify.notify_waiters();
                }
            }
            _ => {}
        }
    }

    fn ingest_captured_event(self: &Arc<Self>, raw: RawCapturedEvent) {
        let action_type = match raw.event_type.as_str() {
            "click" => RecordedActionType::Click,
            "input" => RecordedActionType::Input,
            "checkbox" => RecordedActionType::Checkbox,
            "radio" => RecordedActionType::Radio,
            "select" => RecordedActionType::Select,
            "file_upload" => RecordedActionType::FileUpload,
            "submit" => RecordedActionType::Submit,
            "keypress" => RecordedActionType::Keypress,
            other => {
                warn!(event_type = other, "unknown captured event type, dropping");
                return;
            }
        };

        let ts = timestamp_from_millis(raw.timestamp);
        let mut action = RecordedAction::new(action_type, ts);
        action.target = raw.target.as_ref().map(target_from_raw);
        action.value = raw.value.clone();
        action.position = raw.position.as_ref().map(|p| BoundingRect {
            x: p.x,
            y: p.y,
            width: 0.0,
            height: 0.0,
        });

        let mut metadata = raw.metadata.clone();
        if action_type == RecordedActionType::Submit {
            if let Some(form_data) = metadata.get_mut("formData") {
                redact_form_data(form_data);
            }
        }
        action.metadata = metadata;

        let key = RecordedAction::pending_key(action_type, ts);
        let notify = Arc::new(Notify::new());
        self.pending.insert(
            key.clone(),
            PendingAction {
                action,
                pre_state: raw.pre_state,
                notify: Arc::clone(&notify),
            },
        );

        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(FINALIZE_DELAY_MS)) => {}
                _ = notify.notified() => {}
            }
            this.finalize_pending(&key).await;
        });
    }

    async fn finalize_pending(&self, key: &str) {
        let Some((_, pending)) = self.pending.remove(key) else {
            return;
        };
        let PendingAction { mut action, pre_state, .. } = pending;

        let post = self.sample_post_state().await;
        let requests = self.recent_requests.lock().clone();
        let effects = verify::compute_effects(action.timestamp, pre_state.as_ref(), &post, &requests);
        let elapsed = (Utc::now() - action.timestamp).num_milliseconds().max(0) as u64;
        verify::finalize(&mut action, effects, elapsed);

        info!(action_type = ?action.action_type, verified = action.verified, "action verified");
        self.recorded.lock().push(action);
    }

    async fn sample_post_state(&self) -> PostActionState {
        match self.adapter.evaluate(self.page, POST_STATE_SCRIPT).await {
            Ok(value) => PostActionState {
                url: value.get("url").and_then(|v| v.as_str()).unwrap_or_default().to_string(),
                scroll_x: value.get("scrollX").and_then(|v| v.as_f64()).unwrap_or_default(),
                scroll_y: value.get("scrollY").and_then(|v| v.as_f64()).unwrap_or_default(),
                active_tag: value.get("activeTag").and_then(|v| v.as_str()).map(str::to_string),
                modal_count: value.get("modalCount").and_then(|v| v.as_u64()).unwrap_or_default() as usize,
            },
            Err(err) => {
                warn!(error = %err, "post-action state evaluate failed, recording no effects");
                PostActionState {
                    url: String::new(),
                    scroll_x: 0.0,
                    scroll_y: 0.0,
                    active_tag: None,
                    modal_count: 0,
                }
            }
        }
    }
}

fn target_from_raw(raw: &RawTarget) -> ElementTarget {
    ElementTarget {
        tag_name: raw.tag_name.clone(),
        selector: None,
        text: raw.text.clone(),
        aria_label: raw.aria_label.clone(),
    }
}

fn timestamp_from_millis(ts: f64) -> chrono::DateTime<Utc> {
    chrono::DateTime::from_timestamp((ts / 1000.0) as i64, ((ts % 1000.0) * 1_000_000.0) as u32)
        .unwrap_or_else(Utc::now)
}
