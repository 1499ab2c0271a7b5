//! Chrome DevTools Protocol transport (§6).
//!
//! This crate owns the wire protocol only: connecting to a page's CDP
//! websocket, enabling the domains spec.md §6 names, fanning out the events
//! it consumes, and arbitrating shared debugger ownership between the
//! Browser Context Provider and the Action Recorder (§5 "Shared resources").
//! It has no knowledge of DOM pruning, accessibility trees or agent state —
//! those live in `dom-pruner`, `a11y-tree`, `browser-context` and
//! `action-recorder`, all of which depend on this crate.

pub mod config;
pub mod domains;
pub mod error;
pub mod ids;
pub mod owner;
pub mod transport;

use std::sync::Arc;

pub use config::CdpConfig;
pub use domains::CdpEvent;
pub use error::{CdpError, CdpResult};
pub use ids::{FrameId, PageId, SessionId};
pub use owner::DebuggerOwner;
pub use transport::{NoopTransport, RawNotification, Transport, WsTransport};

/// Facade combining a transport with the debugger-owner arbiter; this is
/// what `browser-context` and `action-recorder` depend on.
pub struct CdpAdapter {
    owner: DebuggerOwner,
}

impl CdpAdapter {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            owner: DebuggerOwner::new(transport),
        }
    }

    /// Construct an adapter with no real Chrome connection; every command
    /// fails. Used by embedders wiring this crate up for tests before a CDP
    /// endpoint is available.
    pub fn noop(_config: CdpConfig) -> Self {
        Self::new(Arc::new(NoopTransport::default()))
    }

    pub async fn connect(config: CdpConfig, target_url_contains: &str) -> CdpResult<Self> {
        let ws_url = transport::discover_page_ws_url(&config.http_endpoint, target_url_contains).await?;
        let transport = WsTransport::connect(&ws_url).await?;
        Ok(Self::new(transport))
    }

    pub async fn is_attached(&self, page: PageId) -> bool {
        self.owner.is_attached(page)
    }

    pub async fn attach(&self, page: PageId, session: SessionId) -> CdpResult<SessionId> {
        self.owner.attach(page, session).await
    }

    pub async fn detach(&self, page: PageId) {
        self.owner.detach(page).await
    }

    pub async fn reattach(&self, page: PageId) -> CdpResult<SessionId> {
        self.owner.reattach(page).await
    }

    pub async fn evaluate(&self, page: PageId, expression: &str) -> CdpResult<serde_json::Value> {
        self.owner.evaluate(page, expression).await
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<RawNotification> {
        self.owner.subscribe_events()
    }

    pub fn translate(notification: &RawNotification) -> CdpEvent {
        DebuggerOwner::translate(notification)
    }
}
