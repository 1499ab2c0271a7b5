//! Single-owner-per-tab debugger arbiter.
//!
//! Resolves the open question in spec.md §9: the Browser Context Provider
//! and the Action Recorder both want the CDP debugger attached to the same
//! tab. First attacher performs the real `Debugger.attach` equivalent
//! (enabling the required domains); subsequent attachers on the same page
//! just bump a refcount and share the session. The session is torn down
//! only once the refcount returns to zero.

use dashmap::DashMap;
use serde_json::json;
use tracing::{info, warn};

use crate::domains::{self, parse_event, CdpEvent};
use crate::error::CdpResult;
use crate::ids::{PageId, SessionId};
use crate::transport::{RawNotification, Transport};
use std::sync::Arc;

struct AttachState {
    session: SessionId,
    refcount: u32,
}

pub struct DebuggerOwner {
    transport: Arc<dyn Transport>,
    owners: DashMap<PageId, AttachState>,
}

impl DebuggerOwner {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            owners: DashMap::new(),
        }
    }

    pub fn is_attached(&self, page: PageId) -> bool {
        self.owners.contains_key(&page)
    }

    /// Attach the debugger to `page`. If another component already holds it,
    /// this just increments the share count and returns the existing
    /// session id instead of re-enabling domains.
    pub async fn attach(&self, page: PageId, session: SessionId) -> CdpResult<SessionId> {
        if let Some(mut entry) = self.owners.get_mut(&page) {
            entry.refcount += 1;
            info!(%page, refcount = entry.refcount, "cdp debugger shared by another owner");
            return Ok(entry.session);
        }

        for (method, _domain) in domains::ENABLE_COMMANDS {
            self.transport.send(Some(&session.to_string()), method, json!({})).await?;
        }
        self.transport
            .send(
                Some(&session.to_string()),
                "Page.setLifecycleEventsEnabled",
                domains::set_lifecycle_events_enabled_params(),
            )
            .await?;

        self.owners.insert(page, AttachState { session, refcount: 1 });
        Ok(session)
    }

    /// Release one owner's hold on `page`. Only the last release actually
    /// detaches.
    pub async fn detach(&self, page: PageId) {
        let Some(mut entry) = self.owners.get_mut(&page) else {
            return;
        };
        entry.refcount = entry.refcount.saturating_sub(1);
        if entry.refcount == 0 {
            drop(entry);
            self.owners.remove(&page);
            info!(%page, "cdp debugger fully detached");
        }
    }

    /// Attempt a single reattach after a detected detach, per §4.3/§4.4
    /// failure semantics ("attempt a reattach; on failure fall back").
    pub async fn reattach(&self, page: PageId) -> CdpResult<SessionId> {
        self.owners.remove(&page);
        self.attach(page, SessionId::new()).await
    }

    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<RawNotification> {
        self.transport.subscribe()
    }

    pub fn translate(notification: &RawNotification) -> CdpEvent {
        parse_event(&notification.method, &notification.params)
    }

    pub async fn evaluate(&self, page: PageId, expression: &str) -> CdpResult<serde_json::Value> {
        let Some(entry) = self.owners.get(&page) else {
            return Err(crate::error::CdpError::NotAttached);
        };
        let session = entry.session;
        drop(entry);
        let result = self
            .transport
            .send(
                Some(&session.to_string()),
                "Runtime.evaluate",
                domains::evaluate_params(expression, true),
            )
            .await?;
        result
            .get("result")
            .and_then(|r| r.get("value"))
            .cloned()
            .ok_or_else(|| {
                warn!(%page, "Runtime.evaluate returned no value");
                crate::error::CdpError::Decode {
                    method: "Runtime.evaluate".to_string(),
                    source: "missing result.value".to_string(),
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::NoopTransport;

    #[tokio::test]
    async fn second_attach_shares_first_session() {
        let transport = Arc::new(NoopTransport::default());
        // The Noop transport fails, so seed a fake owner directly via two
        // successful first-attaches would not work here; this test instead
        // exercises the refcount path once a session has been registered by
        // a stub transport that never errors.
        struct AlwaysOk;
        #[async_trait::async_trait]
        impl Transport for AlwaysOk {
            async fn send(&self, _s: Option<&str>, _m: &str, _p: serde_json::Value) -> CdpResult<serde_json::Value> {
                Ok(serde_json::Value::Null)
            }
            fn subscribe(&self) -> tokio::sync::broadcast::Receiver<RawNotification> {
                let (tx, rx) = tokio::sync::broadcast::channel(1);
                std::mem::forget(tx);
                rx
            }
        }
        let _ = transport; // keep import used
        let owner = DebuggerOwner::new(Arc::new(AlwaysOk));
        let page = PageId::new();
        let first = owner.attach(page, SessionId::new()).await.unwrap();
        let second = owner.attach(page, SessionId::new()).await.unwrap();
        assert_eq!(first, second);
        owner.detach(page).await;
        assert!(owner.is_attached(page));
        owner.detach(page).await;
        assert!(!owner.is_attached(page));
    }
}
