// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Advisory gateway.
//!
//! Every failure that crosses the crate boundary is a typed
//! [`AdvisoryError`] variant so callers can match on the kind instead of
//! string-inspecting opaque exceptions. The retry table from the error
//! handling design lives in [`AdvisoryError::retryable`].

use std::time::Duration;

use thiserror::Error;

/// The primary error type used across all Advisory traits and operations.
#[derive(Debug, Error)]
pub enum AdvisoryError {
    /// Configuration errors (invalid TOML, unknown keys, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// The embedding or generation provider is unreachable or down.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The provider signalled a rate limit.
    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    /// Invalid or missing credentials.
    #[error("authentication rejected: {0}")]
    AuthError(String),

    /// A deadline expired on an external call or on a whole request.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Model output failed the task's schema check.
    ///
    /// The message is written to double as the correction hint fed back
    /// into the prompt on an agent retry.
    #[error("model output failed validation: {0}")]
    Validation(String),

    /// The knowledge base is missing or could not be queried.
    #[error("knowledge base unavailable: {0}")]
    RagUnavailable(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AdvisoryError {
    /// Whether the gateway may retry the failed call.
    ///
    /// Rate limits back off up to the configured attempt budget; timeouts
    /// are retried once. Everything else is surfaced immediately.
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            AdvisoryError::RateLimited(_) | AdvisoryError::Timeout { .. }
        )
    }

    /// Short stable name for logging and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            AdvisoryError::Config(_) => "config",
            AdvisoryError::ProviderUnavailable(_) => "provider_unavailable",
            AdvisoryError::RateLimited(_) => "rate_limited",
            AdvisoryError::AuthError(_) => "auth",
            AdvisoryError::Timeout { .. } => "timeout",
            AdvisoryError::Validation(_) => "validation",
            AdvisoryError::RagUnavailable(_) => "rag_unavailable",
            AdvisoryError::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_table_matches_design() {
        assert!(AdvisoryError::RateLimited("429".into()).retryable());
        assert!(
            AdvisoryError::Timeout {
                duration: Duration::from_secs(30)
            }
            .retryable()
        );

        assert!(!AdvisoryError::ProviderUnavailable("down".into()).retryable());
        assert!(!AdvisoryError::AuthError("bad key".into()).retryable());
        assert!(!AdvisoryError::Validation("missing field".into()).retryable());
        assert!(!AdvisoryError::RagUnavailable("not built".into()).retryable());
        assert!(!AdvisoryError::Config("bad".into()).retryable());
        assert!(!AdvisoryError::Internal("boom".into()).retryable());
    }

    #[test]
    fn kinds_are_distinct() {
        let kinds = [
            AdvisoryError::Config("".into()).kind(),
            AdvisoryError::ProviderUnavailable("".into()).kind(),
            AdvisoryError::RateLimited("".into()).kind(),
            AdvisoryError::AuthError("".into()).kind(),
            AdvisoryError::Timeout {
                duration: Duration::ZERO,
            }
            .kind(),
            AdvisoryError::Validation("".into()).kind(),
            AdvisoryError::RagUnavailable("".into()).kind(),
            AdvisoryError::Internal("".into()).kind(),
        ];
        let mut unique: Vec<&str> = kinds.to_vec();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), kinds.len());
    }
}
