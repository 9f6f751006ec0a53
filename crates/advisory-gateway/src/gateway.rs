// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The cache gateway: memoized, cost-tracked provider invocation.
//!
//! On a cache hit the provider is never called. On a miss the call runs
//! under a deadline, transient failures retry with exponential backoff and
//! jitter bounded by `retry_max` total attempts, and the outcome lands in
//! the cache and the usage ledger.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use advisory_config::model::GatewayConfig;
use advisory_core::error::AdvisoryError;
use advisory_core::traits::GenerationProvider;
use advisory_core::types::{GenerationRequest, GenerationResponse, TokenUsage};

use crate::cache::{ResponseCache, cache_key};
use crate::ledger::{UsageLedger, UsageSnapshot};
use crate::pricing;

/// Result of one gateway invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeOutcome {
    pub text: String,
    pub usage: TokenUsage,
    /// Whether the response came from the cache.
    pub cache_hit: bool,
}

/// Caching, cost-tracking wrapper around a generation provider.
///
/// Constructed once at process start and injected into callers; the entry
/// table and ledger are the only shared mutable state in the core and are
/// safe for concurrent use.
pub struct CacheGateway {
    provider: Arc<dyn GenerationProvider>,
    cache: ResponseCache,
    ledger: UsageLedger,
    config: GatewayConfig,
}

impl CacheGateway {
    pub fn new(provider: Arc<dyn GenerationProvider>, config: GatewayConfig) -> Self {
        Self {
            provider,
            cache: ResponseCache::new(config.ttl(), config.max_cache_entries),
            ledger: UsageLedger::new(),
            config,
        }
    }

    /// Invoke the provider through the cache.
    ///
    /// An empty `request.model` is filled with the configured default
    /// before the cache key is computed.
    pub async fn invoke(
        &self,
        mut request: GenerationRequest,
    ) -> Result<InvokeOutcome, AdvisoryError> {
        if request.model.is_empty() {
            request.model = self.config.chat_model_default.clone();
        }

        let key = cache_key(&request.model, &request.prompt, request.temperature);
        if let Some((text, usage)) = self.cache.get(&key) {
            self.ledger.record_hit();
            metrics::counter!("advisory_cache_hits_total").increment(1);
            debug!(model = request.model.as_str(), "cache hit");
            return Ok(InvokeOutcome {
                text,
                usage,
                cache_hit: true,
            });
        }
        metrics::counter!("advisory_cache_misses_total").increment(1);

        let response = self.call_with_retry(&request).await?;

        let tokens = response.usage.total();
        let cost = pricing::cost_usd(
            &self.config.cost_table,
            self.config.default_cost_per_1k,
            &request.model,
            tokens,
        );
        self.ledger.record_call(tokens, cost);
        metrics::counter!("advisory_provider_calls_total").increment(1);
        self.cache.insert(key, response.text.clone(), response.usage);

        info!(
            model = request.model.as_str(),
            tokens,
            cost_usd = cost,
            "provider call complete"
        );

        Ok(InvokeOutcome {
            text: response.text,
            usage: response.usage,
            cache_hit: false,
        })
    }

    /// Empty the cache without touching the ledger.
    pub fn clear(&self) {
        self.cache.clear();
        info!("response cache cleared");
    }

    /// Read-only usage snapshot.
    pub fn stats(&self) -> UsageSnapshot {
        self.ledger.snapshot(self.cache.len())
    }

    /// Zero the usage ledger. Explicit operator action; the cache is
    /// untouched.
    pub fn reset_ledger(&self) {
        self.ledger.reset();
        info!("usage ledger reset");
    }

    async fn call_with_retry(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, AdvisoryError> {
        let max_attempts = self.config.retry_max.max(1);
        let mut timeout_retries = 0u32;
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            match self.call_once(request).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if !e.retryable() || attempt == max_attempts {
                        return Err(e);
                    }
                    if matches!(e, AdvisoryError::Timeout { .. }) {
                        // A timeout is retried at most once.
                        if timeout_retries >= 1 {
                            return Err(e);
                        }
                        timeout_retries += 1;
                    }
                    let delay = backoff_delay(attempt);
                    warn!(
                        attempt,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "transient provider error, backing off"
                    );
                    last_error = Some(e);
                    tokio::time::sleep(delay).await;
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| AdvisoryError::Internal("provider retry loop made no attempts".to_string())))
    }

    async fn call_once(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, AdvisoryError> {
        let deadline = self.config.request_timeout();
        match tokio::time::timeout(deadline, self.provider.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(AdvisoryError::Timeout { duration: deadline }),
        }
    }
}

/// Exponential backoff with jitter: `2^(attempt-1)` seconds scaled by a
/// random factor in [0.75, 1.25).
fn backoff_delay(attempt: u32) -> Duration {
    let base = Duration::from_secs(1u64 << (attempt - 1).min(6));
    base.mul_f64(0.75 + rand::random::<f64>() * 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisory_test_utils::{MockFailure, MockProvider};

    fn config() -> GatewayConfig {
        GatewayConfig {
            ttl_seconds: 60,
            ..GatewayConfig::default()
        }
    }

    fn request(prompt: &str) -> GenerationRequest {
        GenerationRequest {
            model: "gpt-4o-mini".into(),
            system_prompt: None,
            prompt: prompt.into(),
            max_tokens: 256,
            temperature: 0.7,
        }
    }

    #[tokio::test]
    async fn second_identical_invoke_is_a_cache_hit() {
        let provider = Arc::new(MockProvider::with_responses(vec!["answer".into()]));
        let gateway = CacheGateway::new(provider.clone(), config());

        let first = gateway.invoke(request("same prompt")).await.unwrap();
        let second = gateway.invoke(request("same prompt")).await.unwrap();

        assert!(!first.cache_hit);
        assert!(second.cache_hit);
        assert_eq!(first.text, second.text);
        assert_eq!(provider.call_count(), 1);

        let stats = gateway.stats();
        assert_eq!(stats.total_calls, 1);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.entry_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_causes_second_provider_call() {
        let provider = Arc::new(MockProvider::with_responses(vec![
            "first".into(),
            "second".into(),
        ]));
        let gateway = CacheGateway::new(provider.clone(), config());

        gateway.invoke(request("p")).await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;
        let outcome = gateway.invoke(request("p")).await.unwrap();

        assert!(!outcome.cache_hit);
        assert_eq!(outcome.text, "second");
        assert_eq!(provider.call_count(), 2);
        assert_eq!(gateway.stats().total_calls, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_exhausts_attempts_with_backoff() {
        let provider = Arc::new(MockProvider::new());
        provider.add_failure(MockFailure::RateLimited).await;
        provider.add_failure(MockFailure::RateLimited).await;
        provider.add_failure(MockFailure::RateLimited).await;
        let gateway = CacheGateway::new(provider.clone(), config());

        let started = tokio::time::Instant::now();
        let err = gateway.invoke(request("p")).await.unwrap_err();
        let elapsed = started.elapsed();

        assert!(matches!(err, AdvisoryError::RateLimited(_)));
        // retry_max = 3 total attempts, no 4th.
        assert_eq!(provider.call_count(), 3);
        // Two backoff sleeps of ~1s and ~2s with +/-25% jitter.
        assert!(elapsed >= Duration::from_millis(2250), "elapsed {elapsed:?}");
        assert!(elapsed <= Duration::from_millis(3750), "elapsed {elapsed:?}");
        assert_eq!(gateway.stats().total_calls, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_retried_exactly_once() {
        let provider = Arc::new(MockProvider::new());
        provider.add_failure(MockFailure::Timeout).await;
        provider.add_failure(MockFailure::Timeout).await;
        provider.add_failure(MockFailure::Timeout).await;
        let gateway = CacheGateway::new(provider.clone(), config());

        let err = gateway.invoke(request("p")).await.unwrap_err();
        assert!(matches!(err, AdvisoryError::Timeout { .. }));
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn fatal_errors_are_not_retried() {
        for failure in [MockFailure::Auth, MockFailure::Unavailable] {
            let provider = Arc::new(MockProvider::new());
            provider.add_failure(failure).await;
            let gateway = CacheGateway::new(provider.clone(), config());

            let err = gateway.invoke(request("p")).await.unwrap_err();
            match failure {
                MockFailure::Auth => assert!(matches!(err, AdvisoryError::AuthError(_))),
                _ => assert!(matches!(err, AdvisoryError::ProviderUnavailable(_))),
            }
            assert_eq!(provider.call_count(), 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_then_success_is_invisible_to_caller() {
        let provider = Arc::new(MockProvider::new());
        provider.add_failure(MockFailure::RateLimited).await;
        provider.add_response("recovered").await;
        let gateway = CacheGateway::new(provider.clone(), config());

        let outcome = gateway.invoke(request("p")).await.unwrap();
        assert_eq!(outcome.text, "recovered");
        assert_eq!(provider.call_count(), 2);
        assert_eq!(gateway.stats().total_calls, 1);
    }

    #[tokio::test]
    async fn nearby_temperatures_share_a_cache_entry() {
        let provider = Arc::new(MockProvider::with_responses(vec!["answer".into()]));
        let gateway = CacheGateway::new(provider.clone(), config());

        let mut a = request("p");
        a.temperature = 0.71;
        let mut b = request("p");
        b.temperature = 0.74;

        gateway.invoke(a).await.unwrap();
        let second = gateway.invoke(b).await.unwrap();
        assert!(second.cache_hit);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn clear_empties_cache_but_keeps_ledger() {
        let provider = Arc::new(MockProvider::new());
        let gateway = CacheGateway::new(provider.clone(), config());

        gateway.invoke(request("p")).await.unwrap();
        gateway.clear();

        let stats = gateway.stats();
        assert_eq!(stats.entry_count, 0);
        assert_eq!(stats.total_calls, 1);

        // Same prompt is a miss again after clear.
        gateway.invoke(request("p")).await.unwrap();
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn empty_model_uses_configured_default() {
        let provider = Arc::new(MockProvider::with_responses(vec!["answer".into()]));
        let gateway = CacheGateway::new(provider.clone(), config());

        let mut without_model = request("p");
        without_model.model = String::new();
        gateway.invoke(without_model).await.unwrap();

        let mut explicit = request("p");
        explicit.model = config().chat_model_default;
        let second = gateway.invoke(explicit).await.unwrap();
        assert!(second.cache_hit);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_invokes_never_lose_ledger_increments() {
        let provider = Arc::new(MockProvider::new());
        let gateway = Arc::new(CacheGateway::new(provider.clone(), config()));

        let mut handles = Vec::new();
        for i in 0..32 {
            let gateway = gateway.clone();
            handles.push(tokio::spawn(async move {
                gateway.invoke(request(&format!("prompt {i}"))).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stats = gateway.stats();
        assert_eq!(stats.total_calls, 32);
        assert_eq!(stats.cache_hits, 0);
        assert_eq!(provider.call_count(), 32);
    }
}
