// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding provider trait.

use async_trait::async_trait;

use crate::error::AdvisoryError;

/// Turns text into fixed-length vectors for similarity comparison.
///
/// A whole-provider outage must surface as
/// [`AdvisoryError::ProviderUnavailable`]; a failure scoped to individual
/// inputs may use any other kind so ingest can skip just those records.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a batch of texts, one vector per input, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AdvisoryError>;
}
