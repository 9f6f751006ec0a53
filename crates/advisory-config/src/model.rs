// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Advisory gateway.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Advisory configuration.
///
/// Loaded from a TOML file with environment variable overrides. All
/// sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AdvisoryConfig {
    /// Cache gateway and usage ledger settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Knowledge base and retrieval settings.
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Agent runtime settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// LLM provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,
}

/// Cache gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Cache entry time-to-live in seconds.
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,

    /// Upper bound on cached entries; least-recently-used entries are
    /// evicted beyond this.
    #[serde(default = "default_max_cache_entries")]
    pub max_cache_entries: usize,

    /// Maximum provider attempts per invoke, including the first.
    #[serde(default = "default_retry_max")]
    pub retry_max: u32,

    /// Default chat model when a request leaves the model unset.
    #[serde(default = "default_chat_model")]
    pub chat_model_default: String,

    /// Deadline for a single provider call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Cost per 1000 tokens, keyed by model-name substring.
    #[serde(default = "default_cost_table")]
    pub cost_table: BTreeMap<String, f64>,

    /// Fallback cost per 1000 tokens for models missing from the table.
    #[serde(default = "default_cost_per_1k")]
    pub default_cost_per_1k: f64,
}

impl GatewayConfig {
    /// Cache TTL as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    /// Per-call provider deadline as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
            max_cache_entries: default_max_cache_entries(),
            retry_max: default_retry_max(),
            chat_model_default: default_chat_model(),
            request_timeout_secs: default_request_timeout_secs(),
            cost_table: default_cost_table(),
            default_cost_per_1k: default_cost_per_1k(),
        }
    }
}

fn default_ttl_seconds() -> u64 {
    3600
}

fn default_max_cache_entries() -> usize {
    1024
}

fn default_retry_max() -> u32 {
    3
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_cost_table() -> BTreeMap<String, f64> {
    // Substring-matched rates in USD per 1k tokens, mirroring the models
    // the dashboard actually calls.
    BTreeMap::from([
        ("gpt-4".to_string(), 0.015),
        ("gpt-4o-mini".to_string(), 0.0006),
        ("gpt-5".to_string(), 0.0004),
    ])
}

fn default_cost_per_1k() -> f64 {
    0.0005
}

/// Knowledge base configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KnowledgeConfig {
    /// Embedding model identifier passed to the embedding provider.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// ROAS threshold for the high-performer ingest predicate.
    #[serde(default = "default_roas_threshold")]
    pub roas_threshold: f64,

    /// Records embedded per provider call during ingest.
    #[serde(default = "default_embed_batch_size")]
    pub embed_batch_size: usize,

    /// Deadline for a single embedding call, in seconds.
    #[serde(default = "default_embed_timeout_secs")]
    pub embed_timeout_secs: u64,
}

impl KnowledgeConfig {
    /// Embedding call deadline as a [`Duration`].
    pub fn embed_timeout(&self) -> Duration {
        Duration::from_secs(self.embed_timeout_secs)
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            embedding_model: default_embedding_model(),
            roas_threshold: default_roas_threshold(),
            embed_batch_size: default_embed_batch_size(),
            embed_timeout_secs: default_embed_timeout_secs(),
        }
    }
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_roas_threshold() -> f64 {
    3.0
}

fn default_embed_batch_size() -> usize {
    32
}

fn default_embed_timeout_secs() -> u64 {
    20
}

/// Agent runtime configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Maximum tools executing concurrently within one request.
    #[serde(default = "default_tool_concurrency_limit")]
    pub tool_concurrency_limit: usize,

    /// Conversation history cap; oldest turns drop first.
    #[serde(default = "default_max_conversation_turns")]
    pub max_conversation_turns: usize,

    /// Maximum LLM attempts per request when validation keeps failing.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Wall-clock budget for one whole agent request, in seconds.
    #[serde(default = "default_request_budget_secs")]
    pub request_budget_secs: u64,

    /// Number of retrieved cases the similar-cases tool asks for.
    #[serde(default = "default_retrieval_k")]
    pub retrieval_k: usize,

    /// Target ROAS used by the underperformer tool.
    #[serde(default = "default_target_roas")]
    pub target_roas: f64,
}

impl AgentConfig {
    /// Whole-request wall-clock budget as a [`Duration`].
    pub fn request_budget(&self) -> Duration {
        Duration::from_secs(self.request_budget_secs)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            tool_concurrency_limit: default_tool_concurrency_limit(),
            max_conversation_turns: default_max_conversation_turns(),
            max_attempts: default_max_attempts(),
            request_budget_secs: default_request_budget_secs(),
            retrieval_k: default_retrieval_k(),
            target_roas: default_target_roas(),
        }
    }
}

fn default_tool_concurrency_limit() -> usize {
    4
}

fn default_max_conversation_turns() -> usize {
    20
}

fn default_max_attempts() -> u32 {
    3
}

fn default_request_budget_secs() -> u64 {
    60
}

fn default_retrieval_k() -> usize {
    3
}

fn default_target_roas() -> f64 {
    2.0
}

/// LLM provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// API key. `None` requires an environment override before any call.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
