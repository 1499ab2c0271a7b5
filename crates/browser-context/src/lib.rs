//! Browser Context Provider (§4.3).
//!
//! Owns the live CDP debugger attachment for a page, folds incoming events
//! into bounded console/network ring buffers, and assembles `BrowserContext`
//! snapshots by delegating element scoring to `dom-pruner` and role/name
//! extraction to `a11y-tree`.

pub mod buffers;
pub mod errors;
pub mod provider;
pub mod scripts;
pub mod text;

pub use errors::{ContextError, ContextResult};
pub use provider::BrowserContextProvider;
pub use text::context_to_text;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use browzer_types::ContextOptions;
    use cdp_adapter::{CdpAdapter, CdpConfig, PageId};

    use super::*;

    #[tokio::test]
    async fn get_context_falls_back_when_debugger_not_attached() {
        let adapter = Arc::new(CdpAdapter::noop(CdpConfig::default()));
        let provider = BrowserContextProvider::new(adapter, PageId::new());

        let context = provider.get_context(&ContextOptions::default()).await;
        assert_eq!(context.page.url, "");
        assert!(context.interactive_elements.is_empty());
    }
}
