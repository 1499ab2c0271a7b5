//! `ProviderStats` (§4.6): monotonic per-adapter counters updated after
//! every call — requests, success/failure, tokens, cost, a rolling average
//! latency, and an error-code histogram. Stateless aside from these, as §5
//! requires ("the LLM adapters are stateless per call aside from their
//! `ProviderStats`, which are monotonic counters").

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use browzer_types::TokenUsage;

pub type ErrorHistogram = HashMap<String, u64>;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProviderStatsSnapshot {
    pub requests: u64,
    pub successes: u64,
    pub failures: u64,
    pub total_tokens: TokenUsage,
    pub total_cost: f64,
    pub average_latency_ms: f64,
    pub error_histogram: ErrorHistogram,
}

#[derive(Default)]
struct Inner {
    requests: u64,
    successes: u64,
    failures: u64,
    total_input: u64,
    total_output: u64,
    total_cost: f64,
    latency_sum_ms: u64,
    error_histogram: ErrorHistogram,
}

/// Thread-safe accumulator; adapters hold one and call `record_*` after
/// every attempt (including ones that were retried and eventually failed).
#[derive(Default)]
pub struct ProviderStats {
    inner: Mutex<Inner>,
}

impl ProviderStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, usage: TokenUsage, cost: f64, latency_ms: u64) {
        let mut inner = self.inner.lock();
        inner.requests += 1;
        inner.successes += 1;
        inner.total_input += usage.input as u64;
        inner.total_output += usage.output as u64;
        inner.total_cost += cost;
        inner.latency_sum_ms += latency_ms;
    }

    pub fn record_failure(&self, error_code: &str, latency_ms: u64) {
        let mut inner = self.inner.lock();
        inner.requests += 1;
        inner.failures += 1;
        inner.latency_sum_ms += latency_ms;
        *inner.error_histogram.entry(error_code.to_string()).or_insert(0) += 1;
    }

    pub fn snapshot(&self) -> ProviderStatsSnapshot {
        let inner = self.inner.lock();
        let average_latency_ms = if inner.requests == 0 {
            0.0
        } else {
            inner.latency_sum_ms as f64 / inner.requests as f64
        };
        ProviderStatsSnapshot {
            requests: inner.requests,
            successes: inner.successes,
            failures: inner.failures,
            total_tokens: TokenUsage::new(inner.total_input as u32, inner.total_output as u32),
            total_cost: inner.total_cost,
            average_latency_ms,
            error_histogram: inner.error_histogram.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_successes_and_cost() {
        let stats = ProviderStats::new();
        stats.record_success(TokenUsage::new(100, 50), 0.01, 200);
        stats.record_success(TokenUsage::new(200, 100), 0.02, 400);
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.requests, 2);
        assert_eq!(snapshot.successes, 2);
        assert_eq!(snapshot.total_tokens.total, 450);
        assert!((snapshot.total_cost - 0.03).abs() < 1e-9);
        assert!((snapshot.average_latency_ms - 300.0).abs() < 1e-9);
    }

    #[test]
    fn histograms_failures_by_code() {
        let stats = ProviderStats::new();
        stats.record_failure("rate_limit", 50);
        stats.record_failure("rate_limit", 60);
        stats.record_failure("timeout", 5000);
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.failures, 3);
        assert_eq!(snapshot.error_histogram.get("rate_limit"), Some(&2));
        assert_eq!(snapshot.error_histogram.get("timeout"), Some(&1));
    }
}
