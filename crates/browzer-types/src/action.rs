//! CDP tab-ownership routing types.
//!
//! `cdp-adapter` uses these to resolve the "who owns the debugger" open
//! question (§9): the Browser Context Provider and the Action Recorder
//! both want the CDP debugger attached to the same tab, and a `RoutingHint`
//! lets a caller express a preference the adapter's arbiter can honor
//! without either side needing to know about the other.

use serde::{Deserialize, Serialize};

use crate::ids::{FrameId, PageId, SessionId};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoutePrefer {
    Focused,
    RecentNav,
    MainFrame,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RoutingHint {
    pub session: Option<SessionId>,
    pub page: Option<PageId>,
    pub frame: Option<FrameId>,
    pub prefer: Option<RoutePrefer>,
}

/// A resolved route: the concrete session/page/frame a command should be
/// dispatched against, plus the mutex key serializing concurrent access.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExecRoute {
    pub session: SessionId,
    pub page: PageId,
    pub frame: FrameId,
    pub mutex_key: String,
}

impl ExecRoute {
    pub fn new(session: SessionId, page: PageId, frame: FrameId) -> Self {
        let mutex_key = format!("frame:{}", frame.0);
        Self {
            session,
            page,
            frame,
            mutex_key,
        }
    }
}

impl std::fmt::Display for ExecRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "session={} page={} frame={} mutex={}",
            self.session.0, self.page.0, self.frame.0, self.mutex_key
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exec_route_mutex_key_is_per_frame() {
        let frame = FrameId::new();
        let route = ExecRoute::new(SessionId::new(), PageId::new(), frame.clone());
        assert_eq!(route.mutex_key, format!("frame:{}", frame.0));
    }
}
