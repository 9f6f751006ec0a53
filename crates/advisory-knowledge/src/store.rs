// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge store: ingest and rebuild of versioned document collections.
//!
//! Each logical collection points at a versioned vector-store collection
//! (`name/<version>`). Ingest appends to the current version; rebuild
//! embeds into a fresh version and swaps the current pointer, so readers
//! see either the fully old or fully new collection, never a mix.

use std::collections::HashSet;
use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use advisory_config::model::KnowledgeConfig;
use advisory_core::error::AdvisoryError;
use advisory_core::traits::{EmbeddingProvider, VectorStore};
use advisory_core::types::{PerformanceRecord, UpsertDocument};

use crate::document::{content_hash, document_id, record_metadata, render_record};

/// Outcome of an ingest or rebuild call.
///
/// Per-record embedding failures are recorded here and never abort the
/// batch; only a wholly unavailable provider fails the call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Documents embedded and upserted.
    pub accepted: usize,
    /// Records whose normalized content already existed.
    pub skipped_duplicate: usize,
    /// Records skipped because their embedding call failed.
    pub failed_embedding: usize,
}

/// One immutable version of a collection.
struct CollectionVersion {
    version_id: String,
    store_collection: String,
    hashes: HashSet<String>,
    len: usize,
}

impl CollectionVersion {
    fn empty(name: &str) -> Self {
        let version_id = uuid::Uuid::new_v4().to_string();
        Self {
            store_collection: format!("{name}/{version_id}"),
            version_id,
            hashes: HashSet::new(),
            len: 0,
        }
    }
}

/// Per-collection state: the swap pointer plus a writer lock.
///
/// Readers go through `current` lock-free; ingests and rebuilds for the
/// same collection are serialized by `write_lock`.
struct CollectionState {
    current: ArcSwap<CollectionVersion>,
    write_lock: tokio::sync::Mutex<()>,
}

impl CollectionState {
    fn new(name: &str) -> Self {
        Self {
            current: ArcSwap::from_pointee(CollectionVersion::empty(name)),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }
}

/// A candidate document prepared from a surviving record.
struct Candidate {
    hash: String,
    text: String,
    record: PerformanceRecord,
}

/// Ingests performance records into named, versioned collections.
pub struct KnowledgeStore {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    config: KnowledgeConfig,
    collections: DashMap<String, Arc<CollectionState>>,
}

impl KnowledgeStore {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        config: KnowledgeConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            config,
            collections: DashMap::new(),
        }
    }

    /// The embedding provider, shared with the retriever.
    pub(crate) fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// The vector store, shared with the retriever.
    pub(crate) fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    pub(crate) fn config(&self) -> &KnowledgeConfig {
        &self.config
    }

    /// Resolve a logical collection to its current versioned store
    /// collection and document count. `None` if it was never built.
    pub fn resolve(&self, name: &str) -> Option<(String, usize)> {
        self.collections.get(name).map(|state| {
            let version = state.current.load();
            (version.store_collection.clone(), version.len)
        })
    }

    /// Number of documents currently in a collection.
    pub fn len(&self, name: &str) -> usize {
        self.resolve(name).map(|(_, len)| len).unwrap_or(0)
    }

    /// Whether the collection is missing or empty.
    pub fn is_empty(&self, name: &str) -> bool {
        self.len(name) == 0
    }

    /// Ingest records into the current version of `name`.
    ///
    /// Records failing `predicate` are dropped silently; records whose
    /// normalized content already exists (in the collection or earlier in
    /// the batch) count as `skipped_duplicate`.
    pub async fn ingest<F>(
        &self,
        name: &str,
        records: &[PerformanceRecord],
        predicate: F,
    ) -> Result<IngestReport, AdvisoryError>
    where
        F: Fn(&PerformanceRecord) -> bool,
    {
        let state = self.state(name);
        let _guard = state.write_lock.lock().await;

        let current = state.current.load_full();
        let (candidates, skipped) = prepare_candidates(records, &predicate, &current.hashes);
        if candidates.is_empty() {
            return Ok(IngestReport {
                skipped_duplicate: skipped,
                ..IngestReport::default()
            });
        }

        let (docs, failed) = self.embed_candidates(candidates).await?;
        let accepted = docs.len();

        let mut hashes = current.hashes.clone();
        hashes.extend(docs.iter().map(|d| d.content_hash.clone()));
        self.store
            .upsert(&current.store_collection, docs)
            .await?;

        state.current.store(Arc::new(CollectionVersion {
            version_id: current.version_id.clone(),
            store_collection: current.store_collection.clone(),
            len: current.len + accepted,
            hashes,
        }));

        let report = IngestReport {
            accepted,
            skipped_duplicate: skipped,
            failed_embedding: failed,
        };
        info!(
            collection = name,
            accepted = report.accepted,
            skipped_duplicate = report.skipped_duplicate,
            failed_embedding = report.failed_embedding,
            "ingest complete"
        );
        Ok(report)
    }

    /// Build a brand-new version of `name` from scratch, then atomically
    /// swap the current pointer. The superseded version is dropped from the
    /// vector store only after the swap.
    pub async fn rebuild<F>(
        &self,
        name: &str,
        records: &[PerformanceRecord],
        predicate: F,
    ) -> Result<IngestReport, AdvisoryError>
    where
        F: Fn(&PerformanceRecord) -> bool,
    {
        let state = self.state(name);
        let _guard = state.write_lock.lock().await;

        let fresh = CollectionVersion::empty(name);
        let (candidates, skipped) = prepare_candidates(records, &predicate, &HashSet::new());

        let (docs, failed) = self.embed_candidates(candidates).await?;
        let accepted = docs.len();
        let hashes: HashSet<String> = docs.iter().map(|d| d.content_hash.clone()).collect();

        if !docs.is_empty() {
            self.store.upsert(&fresh.store_collection, docs).await?;
        }

        let old = state.current.load_full();
        state.current.store(Arc::new(CollectionVersion {
            version_id: fresh.version_id,
            store_collection: fresh.store_collection,
            len: accepted,
            hashes,
        }));

        if let Err(e) = self.store.drop_collection(&old.store_collection).await {
            warn!(
                collection = name,
                version = old.version_id.as_str(),
                error = %e,
                "failed to drop superseded collection version"
            );
        }

        let report = IngestReport {
            accepted,
            skipped_duplicate: skipped,
            failed_embedding: failed,
        };
        info!(
            collection = name,
            accepted = report.accepted,
            skipped_duplicate = report.skipped_duplicate,
            failed_embedding = report.failed_embedding,
            "rebuild complete"
        );
        Ok(report)
    }

    /// Embed a single query string under the configured deadline.
    pub(crate) async fn embed_query(&self, query: &str) -> Result<Vec<f32>, AdvisoryError> {
        let texts = [query.to_string()];
        let mut vectors = self.embed_call(&texts).await?;
        vectors
            .pop()
            .ok_or_else(|| AdvisoryError::Internal("embedding returned no vectors".to_string()))
    }

    fn state(&self, name: &str) -> Arc<CollectionState> {
        self.collections
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(CollectionState::new(name)))
            .clone()
    }

    /// Embed candidates in batches. A failed batch falls back to embedding
    /// its records one at a time so a single bad record cannot sink its
    /// neighbors; a wholly unavailable provider aborts the call.
    async fn embed_candidates(
        &self,
        candidates: Vec<Candidate>,
    ) -> Result<(Vec<UpsertDocument>, usize), AdvisoryError> {
        let batch_size = self.config.embed_batch_size.max(1);
        let mut docs = Vec::with_capacity(candidates.len());
        let mut failed = 0usize;

        for chunk in candidates.chunks(batch_size) {
            let texts: Vec<String> = chunk.iter().map(|c| c.text.clone()).collect();
            match self.embed_call(&texts).await {
                Ok(vectors) => {
                    if vectors.len() != chunk.len() {
                        return Err(AdvisoryError::Internal(format!(
                            "embedding provider returned {} vectors for {} inputs",
                            vectors.len(),
                            chunk.len()
                        )));
                    }
                    for (candidate, embedding) in chunk.iter().zip(vectors) {
                        docs.push(to_upsert(candidate, embedding));
                    }
                }
                Err(e) if is_fatal_for_ingest(&e) => return Err(e),
                Err(e) => {
                    warn!(error = %e, batch = chunk.len(), "batch embedding failed, retrying per record");
                    for candidate in chunk {
                        match self.embed_call(std::slice::from_ref(&candidate.text)).await {
                            Ok(mut vectors) => match vectors.pop() {
                                Some(embedding) => docs.push(to_upsert(candidate, embedding)),
                                None => failed += 1,
                            },
                            Err(e) if is_fatal_for_ingest(&e) => return Err(e),
                            Err(e) => {
                                warn!(
                                    source_id = candidate.record.source_id.as_str(),
                                    error = %e,
                                    "skipping record after embedding failure"
                                );
                                failed += 1;
                            }
                        }
                    }
                }
            }
        }

        Ok((docs, failed))
    }

    async fn embed_call(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AdvisoryError> {
        let deadline = self.config.embed_timeout();
        match tokio::time::timeout(deadline, self.embedder.embed(texts)).await {
            Ok(result) => result,
            Err(_) => Err(AdvisoryError::Timeout { duration: deadline }),
        }
    }
}

/// Filter by predicate, render, hash, and dedupe against existing hashes
/// and within the batch. Returns surviving candidates and the duplicate
/// count.
fn prepare_candidates<F>(
    records: &[PerformanceRecord],
    predicate: &F,
    existing: &HashSet<String>,
) -> (Vec<Candidate>, usize)
where
    F: Fn(&PerformanceRecord) -> bool,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut candidates = Vec::new();
    let mut skipped = 0usize;

    for record in records.iter().filter(|r| predicate(r)) {
        let hash = content_hash(record);
        if existing.contains(&hash) || !seen.insert(hash.clone()) {
            skipped += 1;
            continue;
        }
        candidates.push(Candidate {
            hash,
            text: render_record(record),
            record: record.clone(),
        });
    }

    (candidates, skipped)
}

fn to_upsert(candidate: &Candidate, embedding: Vec<f32>) -> UpsertDocument {
    UpsertDocument {
        id: document_id(&candidate.hash),
        text: candidate.text.clone(),
        embedding,
        metadata: record_metadata(&candidate.record),
        content_hash: candidate.hash.clone(),
    }
}

/// Errors that mean the embedding provider is wholly unavailable, aborting
/// the ingest instead of skipping individual records. A timed-out batch is
/// transient and falls through to the per-record path, giving each record
/// one more attempt.
fn is_fatal_for_ingest(error: &AdvisoryError) -> bool {
    matches!(
        error,
        AdvisoryError::ProviderUnavailable(_) | AdvisoryError::AuthError(_)
    )
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use advisory_test_utils::{MockEmbedder, sample_records};

    use crate::memory_store::MemoryVectorStore;

    fn store_with(embedder: MockEmbedder) -> KnowledgeStore {
        KnowledgeStore::new(
            Arc::new(embedder),
            Arc::new(MemoryVectorStore::new()),
            KnowledgeConfig::default(),
        )
    }

    #[tokio::test]
    async fn ingest_skips_duplicates_within_batch() {
        let store = store_with(MockEmbedder::new(8));
        // 90 unique records plus 10 repeats of the first ten.
        let mut records = sample_records(90, 4.0);
        records.extend(sample_records(10, 4.0));

        let report = store
            .ingest("ad_creatives", &records, |_| true)
            .await
            .unwrap();
        assert_eq!(report.accepted, 90);
        assert_eq!(report.skipped_duplicate, 10);
        assert_eq!(report.failed_embedding, 0);
        assert_eq!(store.len("ad_creatives"), 90);
    }

    #[tokio::test]
    async fn ingest_twice_is_idempotent() {
        let store = store_with(MockEmbedder::new(8));
        let records = sample_records(20, 4.0);

        let first = store.ingest("c", &records, |_| true).await.unwrap();
        assert_eq!(first.accepted, 20);

        let second = store.ingest("c", &records, |_| true).await.unwrap();
        assert_eq!(second.accepted, 0);
        assert_eq!(second.skipped_duplicate, 20);
        assert_eq!(store.len("c"), 20);
    }

    #[tokio::test]
    async fn predicate_filters_records() {
        let store = store_with(MockEmbedder::new(8));
        let mut records = sample_records(10, 4.0);
        records.extend(sample_records(5, 1.0).into_iter().map(|mut r| {
            r.headline = format!("low {}", r.headline);
            r
        }));

        let report = store
            .ingest("c", &records, crate::document::roas_at_least(3.0))
            .await
            .unwrap();
        assert_eq!(report.accepted, 10);
        // Below-threshold records are neither accepted nor duplicates.
        assert_eq!(report.skipped_duplicate, 0);
    }

    #[tokio::test]
    async fn per_record_embedding_failure_skips_only_that_record() {
        let embedder = MockEmbedder::new(8);
        embedder.fail_on("poison");
        let store = store_with(embedder);

        let mut records = sample_records(5, 4.0);
        records[2].headline = "poison headline".into();

        let report = store.ingest("c", &records, |_| true).await.unwrap();
        assert_eq!(report.accepted, 4);
        assert_eq!(report.failed_embedding, 1);
        assert_eq!(store.len("c"), 4);
    }

    /// Embedder whose first call hangs past any deadline; later calls
    /// answer normally.
    struct SlowFirstCallEmbedder {
        inner: MockEmbedder,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProvider for SlowFirstCallEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AdvisoryError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            self.inner.embed(texts).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn batch_timeout_falls_back_to_per_record() {
        let embedder = Arc::new(SlowFirstCallEmbedder {
            inner: MockEmbedder::new(8),
            calls: AtomicUsize::new(0),
        });
        let store = KnowledgeStore::new(
            embedder.clone(),
            Arc::new(MemoryVectorStore::new()),
            KnowledgeConfig::default(),
        );

        let report = store
            .ingest("c", &sample_records(3, 4.0), |_| true)
            .await
            .unwrap();

        assert_eq!(report.accepted, 3);
        assert_eq!(report.failed_embedding, 0);
        assert_eq!(store.len("c"), 3);
        // One timed-out batch call, then one call per record.
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn unavailable_provider_fails_fast() {
        let embedder = MockEmbedder::new(8);
        embedder.fail_all();
        let store = store_with(embedder);

        let err = store
            .ingest("c", &sample_records(3, 4.0), |_| true)
            .await
            .unwrap_err();
        assert!(matches!(err, AdvisoryError::ProviderUnavailable(_)));
        assert_eq!(store.len("c"), 0);
    }

    #[tokio::test]
    async fn rebuild_replaces_previous_contents() {
        let store = store_with(MockEmbedder::new(8));
        store
            .ingest("c", &sample_records(10, 4.0), |_| true)
            .await
            .unwrap();
        let (old_collection, _) = store.resolve("c").unwrap();

        let report = store
            .rebuild("c", &sample_records(4, 4.0), |_| true)
            .await
            .unwrap();
        assert_eq!(report.accepted, 4);
        assert_eq!(store.len("c"), 4);

        let (new_collection, _) = store.resolve("c").unwrap();
        assert_ne!(old_collection, new_collection);
    }
}
