//! The adapter capability set (§4.6, §9): `generateCompletion`,
//! `streamCompletion`, `getCapabilities`, `listModels`. Retry/stat logic
//! belongs to the shared base (`retry`, `stats`); provider-specific wire
//! conversion is the only thing each adapter owns.

use async_trait::async_trait;

use browzer_types::{BrowzerResult, LlmRequest, LlmResponse, ProviderCapabilities, StreamChunk};

use crate::stats::ProviderStatsSnapshot;

/// Callback invoked once per chunk during `stream_completion`. Boxed so the
/// trait stays object-safe across adapters with different closures.
pub type StreamSink<'a> = dyn FnMut(StreamChunk) + Send + 'a;

#[async_trait]
pub trait LlmProviderAdapter: Send + Sync {
    /// Provider name, e.g. `"anthropic"`, `"openai"`, `"gemini"`.
    fn name(&self) -> &str;

    async fn generate_completion(&self, request: &LlmRequest) -> BrowzerResult<LlmResponse>;

    /// Streams a completion, invoking `on_chunk` for every chunk in arrival
    /// order, and returns the same unified response `generate_completion`
    /// would have returned once the stream completes.
    async fn stream_completion(
        &self,
        request: &LlmRequest,
        on_chunk: &mut StreamSink<'_>,
    ) -> BrowzerResult<LlmResponse>;

    fn get_capabilities(&self) -> ProviderCapabilities;

    fn list_models(&self) -> Vec<String>;

    fn stats(&self) -> ProviderStatsSnapshot;
}
