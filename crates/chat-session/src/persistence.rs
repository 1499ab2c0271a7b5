//! Optional persistence hook (§4.8: "All mutations ... dispatch optional
//! persistence"), following the same `trait ... ; struct Noop...` shape the
//! donor kernel uses to make its state center's sink pluggable.

use browzer_types::ChatSession;

pub trait SessionPersistence: Send + Sync {
    fn persist(&self, session: &ChatSession);
}

/// Default: persistence is off. The manager still dispatches the call on
/// every mutation; this sink simply drops it.
pub struct NoopPersistence;

impl SessionPersistence for NoopPersistence {
    fn persist(&self, _session: &ChatSession) {}
}
