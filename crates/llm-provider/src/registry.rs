//! Model-name to adapter lookup used by the orchestrator's provider
//! selection (§4.10): "resolve by requested model or provider name; if not
//! registered, fall back to the first registered adapter and log a
//! warning" rather than failing the whole execution over a config typo.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use browzer_types::{BrowzerError, BrowzerResult};

use crate::provider::LlmProviderAdapter;

#[derive(Default)]
pub struct ProviderRegistry {
    by_provider: HashMap<String, Arc<dyn LlmProviderAdapter>>,
    by_model: HashMap<String, String>,
    insertion_order: Vec<String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an adapter under its own `name()` and associates every
    /// model it advertises via `list_models()` with that provider name.
    pub fn register(&mut self, adapter: Arc<dyn LlmProviderAdapter>) {
        let provider = adapter.name().to_string();
        for model in adapter.list_models() {
            self.by_model.insert(model, provider.clone());
        }
        if !self.by_provider.contains_key(&provider) {
            self.insertion_order.push(provider.clone());
        }
        self.by_provider.insert(provider, adapter);
    }

    /// Resolves a provider by explicit name, by model name, or — if neither
    /// is registered — falls back to the first-registered adapter.
    pub fn resolve(&self, provider_or_model: Option<&str>) -> BrowzerResult<Arc<dyn LlmProviderAdapter>> {
        if let Some(key) = provider_or_model {
            if let Some(adapter) = self.by_provider.get(key) {
                return Ok(adapter.clone());
            }
            if let Some(provider) = self.by_model.get(key) {
                if let Some(adapter) = self.by_provider.get(provider) {
                    return Ok(adapter.clone());
                }
            }
            warn!(requested = %key, "no provider registered for requested model/provider, falling back");
        }
        self.first().ok_or_else(|| BrowzerError::not_found("no LLM providers registered"))
    }

    pub fn first(&self) -> Option<Arc<dyn LlmProviderAdapter>> {
        self.insertion_order
            .first()
            .and_then(|name| self.by_provider.get(name))
            .cloned()
    }

    pub fn providers(&self) -> Vec<&str> {
        self.insertion_order.iter().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.by_provider.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockAdapter;

    #[test]
    fn resolves_by_provider_name_and_falls_back() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(MockAdapter::immediate_completion("hi")));

        let resolved = registry.resolve(Some("mock")).unwrap();
        assert_eq!(resolved.name(), "mock");

        let fallback = registry.resolve(Some("nonexistent-provider")).unwrap();
        assert_eq!(fallback.name(), "mock");
    }

    #[test]
    fn resolves_by_model_name() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(MockAdapter::immediate_completion("hi")));
        let resolved = registry.resolve(Some("mock-model")).unwrap();
        assert_eq!(resolved.name(), "mock");
    }

    #[test]
    fn empty_registry_resolve_errors() {
        let registry = ProviderRegistry::new();
        assert!(registry.resolve(None).is_err());
    }
}
