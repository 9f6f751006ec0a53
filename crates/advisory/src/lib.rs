// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The dashboard-facing facade over the advisory core.
//!
//! [`Advisory`] wires the cache gateway, knowledge store, retriever, and
//! agent runtime together from one [`AdvisoryConfig`] and exposes the
//! small typed interface the dashboard calls: build or rebuild the
//! knowledge base, ask it directly, run an agent task, and inspect or
//! clear the cache.

use std::str::FromStr;
use std::sync::Arc;

use advisory_agent::runtime::AgentRuntime;
use advisory_agent::session::ConversationState;
use advisory_agent::result::{AgentResult, TaskKind};
use advisory_config::model::AdvisoryConfig;
use advisory_core::error::AdvisoryError;
use advisory_core::traits::{EmbeddingProvider, GenerationProvider, VectorStore};
use advisory_core::types::{Document, Filter, PerformanceRecord};
use advisory_gateway::{CacheGateway, UsageSnapshot};
use advisory_knowledge::memory_store::MemoryVectorStore;
use advisory_knowledge::retriever::Retriever;
use advisory_knowledge::store::{IngestReport, KnowledgeStore};
use advisory_knowledge::roas_at_least;
use advisory_openai::OpenAiClient;

pub use advisory_agent as agent;
pub use advisory_config as config;
pub use advisory_core as core;
pub use advisory_gateway as gateway;
pub use advisory_knowledge as knowledge;
pub use advisory_openai as openai;

/// Collection the dashboard's ad-creative knowledge base lives in.
pub const DEFAULT_COLLECTION: &str = "ad_creatives";

/// Initializes the tracing subscriber, honoring `RUST_LOG` when set.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("advisory={log_level},warn")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// The advisory core, constructed once at process start and shared by
/// all dashboard requests.
pub struct Advisory {
    config: AdvisoryConfig,
    gateway: Arc<CacheGateway>,
    knowledge: Arc<KnowledgeStore>,
    retriever: Arc<Retriever>,
    runtime: AgentRuntime,
}

impl Advisory {
    /// Wire the core from a config and explicit provider implementations.
    pub fn new(
        config: AdvisoryConfig,
        provider: Arc<dyn GenerationProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        let gateway = Arc::new(CacheGateway::new(provider, config.gateway.clone()));
        let knowledge = Arc::new(KnowledgeStore::new(
            embedder,
            store,
            config.knowledge.clone(),
        ));
        let retriever = Arc::new(Retriever::new(knowledge.clone()));
        let runtime = AgentRuntime::new(
            gateway.clone(),
            Some(retriever.clone()),
            DEFAULT_COLLECTION,
            config.agent.clone(),
        );
        Self {
            config,
            gateway,
            knowledge,
            retriever,
            runtime,
        }
    }

    /// Wire the core against the configured OpenAI-compatible API, with
    /// the in-memory vector store.
    pub fn from_config(config: AdvisoryConfig) -> Result<Self, AdvisoryError> {
        let client = Arc::new(OpenAiClient::new(
            &config.provider,
            config.knowledge.embedding_model.clone(),
        )?);
        Ok(Self::new(
            config,
            client.clone(),
            client,
            Arc::new(MemoryVectorStore::new()),
        ))
    }

    /// Rebuild `collection` from scratch out of `records`, keeping only
    /// those passing `predicate`. Readers see the old version until the
    /// new one is complete.
    pub async fn build_or_rebuild_knowledge_base<F>(
        &self,
        collection: &str,
        records: &[PerformanceRecord],
        predicate: F,
    ) -> Result<IngestReport, AdvisoryError>
    where
        F: Fn(&PerformanceRecord) -> bool,
    {
        self.knowledge.rebuild(collection, records, predicate).await
    }

    /// Rebuild the default collection with the configured high-performer
    /// predicate.
    pub async fn build_default_knowledge_base(
        &self,
        records: &[PerformanceRecord],
    ) -> Result<IngestReport, AdvisoryError> {
        self.build_or_rebuild_knowledge_base(
            DEFAULT_COLLECTION,
            records,
            roas_at_least(self.config.knowledge.roas_threshold),
        )
        .await
    }

    /// Direct retrieval from the default collection, no generation.
    pub async fn ask(
        &self,
        query: &str,
        k: usize,
        filters: &[Filter],
    ) -> Result<Vec<Document>, AdvisoryError> {
        let hits = self
            .retriever
            .search(DEFAULT_COLLECTION, query, k, filters)
            .await?;
        Ok(hits.into_iter().map(|(doc, _score)| doc).collect())
    }

    /// Run one agent task. `task_name` is one of `optimization`,
    /// `copywriting`, `conversational`; `state` is the caller-owned
    /// conversation for `session_id`.
    pub async fn run_agent(
        &self,
        task_name: &str,
        session_id: &str,
        user_message: &str,
        context_records: Arc<Vec<PerformanceRecord>>,
        state: &mut ConversationState,
    ) -> Result<AgentResult, AdvisoryError> {
        let task = TaskKind::from_str(task_name).map_err(|_| {
            AdvisoryError::Config(format!("unknown agent task '{task_name}'"))
        })?;
        self.runtime
            .run(task, session_id, user_message, context_records, state)
            .await
    }

    /// Read-only usage counters and cache occupancy.
    pub fn get_usage_stats(&self) -> UsageSnapshot {
        self.gateway.stats()
    }

    /// Empty the response cache. The usage ledger is untouched.
    pub fn clear_cache(&self) {
        self.gateway.clear();
    }

    /// Zero the usage ledger. Explicit operator action.
    pub fn reset_usage_stats(&self) {
        self.gateway.reset_ledger();
    }

    pub fn config(&self) -> &AdvisoryConfig {
        &self.config
    }
}
