// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text-generation provider trait.

use async_trait::async_trait;

use crate::error::AdvisoryError;
use crate::types::{GenerationRequest, GenerationResponse};

/// A text-generation provider (OpenAI, Anthropic, a local model, ...).
///
/// Implementations classify their failures into [`AdvisoryError`] kinds;
/// retry policy is owned by the cache gateway, not the provider. Callers
/// enforce deadlines by wrapping the call in `tokio::time::timeout`.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Sends a generation request and returns the full response.
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, AdvisoryError>;
}
