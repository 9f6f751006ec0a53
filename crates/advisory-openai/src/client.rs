// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for OpenAI-compatible chat completion and embedding
//! endpoints.
//!
//! The client only classifies failures into [`AdvisoryError`] kinds;
//! retry policy and deadlines are owned by the callers (the cache gateway
//! and the knowledge store).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::debug;

use advisory_config::model::ProviderConfig;
use advisory_core::error::AdvisoryError;
use advisory_core::traits::{EmbeddingProvider, GenerationProvider};
use advisory_core::types::{GenerationRequest, GenerationResponse, TokenUsage};

use crate::types::{
    ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse, ChatMessage,
    EmbeddingRequest, EmbeddingResponse,
};

/// Hard upper bound on any single HTTP exchange, far above every
/// caller-enforced deadline.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(300);

/// OpenAI-compatible API client implementing both provider traits.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    embedding_model: String,
}

impl OpenAiClient {
    /// Build a client from the provider config section.
    ///
    /// Fails with a config error when no API key is set.
    pub fn new(config: &ProviderConfig, embedding_model: String) -> Result<Self, AdvisoryError> {
        let api_key = config.api_key.as_deref().ok_or_else(|| {
            AdvisoryError::Config("provider.api_key is not set".to_string())
        })?;

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| AdvisoryError::Config(format!("invalid API key value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(CLIENT_TIMEOUT)
            .build()
            .map_err(|e| {
                AdvisoryError::Internal(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            embedding_model,
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    async fn read_error(response: reqwest::Response) -> AdvisoryError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(api_err) => format!("{} ({})", api_err.error.message, api_err.error.type_),
            Err(_) => format!("HTTP {status}: {body}"),
        };
        classify_status(status, message)
    }
}

/// Map an HTTP status to the error kind the retry table understands.
fn classify_status(status: StatusCode, message: String) -> AdvisoryError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AdvisoryError::AuthError(message),
        StatusCode::TOO_MANY_REQUESTS => AdvisoryError::RateLimited(message),
        s if s.is_server_error() => AdvisoryError::ProviderUnavailable(message),
        _ => AdvisoryError::Internal(message),
    }
}

/// Map a transport-level failure.
fn classify_transport(e: reqwest::Error) -> AdvisoryError {
    if e.is_timeout() {
        AdvisoryError::Timeout {
            duration: CLIENT_TIMEOUT,
        }
    } else {
        AdvisoryError::ProviderUnavailable(format!("request failed: {e}"))
    }
}

#[async_trait]
impl GenerationProvider for OpenAiClient {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, AdvisoryError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system_prompt {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        let body = ChatCompletionRequest {
            model: request.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        debug!(status = %status, model = request.model.as_str(), "chat completion response");
        if !status.is_success() {
            return Err(Self::read_error(response).await);
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            AdvisoryError::Internal(format!("failed to parse chat response: {e}"))
        })?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                AdvisoryError::Internal("chat response contained no choices".to_string())
            })?;

        Ok(GenerationResponse {
            text,
            usage: TokenUsage {
                prompt_tokens: parsed.usage.prompt_tokens,
                completion_tokens: parsed.usage.completion_tokens,
            },
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AdvisoryError> {
        let body = EmbeddingRequest {
            model: self.embedding_model.clone(),
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        debug!(status = %status, batch = texts.len(), "embedding response");
        if !status.is_success() {
            return Err(Self::read_error(response).await);
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            AdvisoryError::Internal(format!("failed to parse embedding response: {e}"))
        })?;
        if parsed.data.len() != texts.len() {
            return Err(AdvisoryError::Internal(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        // The API may return entries out of order; restore input order.
        let mut data = parsed.data;
        data.sort_by_key(|entry| entry.index);
        Ok(data.into_iter().map(|entry| entry.embedding).collect())
    }
}
