// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation provider for deterministic testing.
//!
//! `MockProvider` implements `GenerationProvider` with pre-configured
//! outcomes popped from a FIFO queue, enabling fast, CI-runnable tests
//! without external API calls.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use advisory_core::error::AdvisoryError;
use advisory_core::traits::GenerationProvider;
use advisory_core::types::{GenerationRequest, GenerationResponse, TokenUsage};

/// A scripted failure kind, converted into the matching [`AdvisoryError`]
/// when popped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    RateLimited,
    Timeout,
    Unavailable,
    Auth,
}

impl MockFailure {
    fn into_error(self) -> AdvisoryError {
        match self {
            MockFailure::RateLimited => {
                AdvisoryError::RateLimited("mock rate limit".to_string())
            }
            MockFailure::Timeout => AdvisoryError::Timeout {
                duration: Duration::from_secs(30),
            },
            MockFailure::Unavailable => {
                AdvisoryError::ProviderUnavailable("mock provider offline".to_string())
            }
            MockFailure::Auth => AdvisoryError::AuthError("mock invalid key".to_string()),
        }
    }
}

/// A mock generation provider that returns pre-configured outcomes.
///
/// Outcomes are popped from a FIFO queue. When the queue is empty, a
/// default "mock response" text is returned. Every call increments the
/// call counter, hits and misses alike live with the caller.
pub struct MockProvider {
    outcomes: Arc<Mutex<VecDeque<Result<String, MockFailure>>>>,
    calls: AtomicU64,
}

impl MockProvider {
    /// Create a new mock provider with an empty outcome queue.
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            calls: AtomicU64::new(0),
        }
    }

    /// Create a mock provider pre-loaded with the given response texts.
    pub fn with_responses(responses: Vec<String>) -> Self {
        let provider = Self::new();
        {
            let outcomes = provider.outcomes.clone();
            let mut queue = outcomes.try_lock().expect("fresh mutex");
            queue.extend(responses.into_iter().map(Ok));
        }
        provider
    }

    /// Queue a successful response text.
    pub async fn add_response(&self, text: impl Into<String>) {
        self.outcomes.lock().await.push_back(Ok(text.into()));
    }

    /// Queue a scripted failure.
    pub async fn add_failure(&self, failure: MockFailure) {
        self.outcomes.lock().await.push_back(Err(failure));
    }

    /// Number of `generate` calls made so far.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    async fn generate(
        &self,
        _request: &GenerationRequest,
    ) -> Result<GenerationResponse, AdvisoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.outcomes.lock().await.pop_front();
        match outcome {
            Some(Ok(text)) => Ok(GenerationResponse {
                text,
                usage: TokenUsage {
                    prompt_tokens: 10,
                    completion_tokens: 20,
                },
            }),
            Some(Err(failure)) => Err(failure.into_error()),
            None => Ok(GenerationResponse {
                text: "mock response".to_string(),
                usage: TokenUsage {
                    prompt_tokens: 10,
                    completion_tokens: 20,
                },
            }),
        }
    }
}
