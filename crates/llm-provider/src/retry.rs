//! Exponential backoff over the retryable error classes (§4.6, §7):
//! rate-limit, network, timeout and generic stream errors back off and
//! retry; authentication, invalid-request and tool-calling errors surface
//! immediately.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use browzer_types::{BrowzerError, BrowzerResult};

#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 500,
        }
    }
}

/// Runs `op` up to `policy.max_retries + 1` times, doubling the delay after
/// each retryable failure. Stops immediately on a non-retryable error.
pub async fn with_retries<T, F, Fut>(policy: RetryPolicy, mut op: F) -> BrowzerResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = BrowzerResult<T>>,
{
    let mut delay_ms = policy.base_delay_ms;
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let retryable = err.is_retryable();
                if !retryable || attempt >= policy.max_retries {
                    return Err(err);
                }
                warn!(
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    delay_ms,
                    error = %err,
                    "LLM request failed, retrying"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                delay_ms = delay_ms.saturating_mul(2);
                attempt += 1;
            }
        }
    }
}

/// Error-code label used by `ProviderStats`' histogram, mirroring the
/// taxonomy in §7.
pub fn error_code(err: &BrowzerError) -> &'static str {
    match err {
        BrowzerError::Authentication(_) => "authentication",
        BrowzerError::RateLimit(_) => "rate_limit",
        BrowzerError::InvalidRequest(_) => "invalid_request",
        BrowzerError::Network(_) => "network",
        BrowzerError::Timeout { .. } => "timeout",
        BrowzerError::ToolCalling(_) => "tool_calling",
        BrowzerError::Stream(_) => "stream",
        BrowzerError::NotFound(_) => "not_found",
        BrowzerError::Validation { .. } => "validation",
        BrowzerError::Internal(_) => "internal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_retryable_errors_until_success() {
        let attempts = AtomicU32::new(0);
        let policy = RetryPolicy { max_retries: 3, base_delay_ms: 1 };
        let result = with_retries(policy, || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(BrowzerError::RateLimit("slow down".into()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_immediately_on_non_retryable_error() {
        let attempts = AtomicU32::new(0);
        let policy = RetryPolicy { max_retries: 3, base_delay_ms: 1 };
        let result: BrowzerResult<i32> = with_retries(policy, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(BrowzerError::Authentication("bad key".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausts_retries_and_returns_last_error() {
        let attempts = AtomicU32::new(0);
        let policy = RetryPolicy { max_retries: 2, base_delay_ms: 1 };
        let result: BrowzerResult<i32> = with_retries(policy, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(BrowzerError::Network("down".into())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
