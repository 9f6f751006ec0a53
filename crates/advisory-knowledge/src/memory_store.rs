// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`VectorStore`] implementation.
//!
//! Documents are kept in insertion order per collection; nearest-neighbor
//! queries do a cosine scan over the filtered set. This is the workspace's
//! provided store; persistent backends plug in through the same trait.

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;

use advisory_core::error::AdvisoryError;
use advisory_core::traits::VectorStore;
use advisory_core::types::{Document, Filter, UpsertDocument};

/// Cosine similarity between two vectors. Zero-norm inputs score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

struct StoredDoc {
    id: String,
    text: String,
    embedding: Vec<f32>,
    metadata: advisory_core::types::DocMetadata,
    content_hash: String,
    seq: u64,
}

#[derive(Default)]
struct MemoryCollection {
    docs: Vec<StoredDoc>,
    index: HashMap<String, usize>,
    next_seq: u64,
}

/// Insertion-ordered in-memory vector store with cosine scoring.
#[derive(Default)]
pub struct MemoryVectorStore {
    collections: DashMap<String, MemoryCollection>,
}

impl MemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert(
        &self,
        collection: &str,
        docs: Vec<UpsertDocument>,
    ) -> Result<(), AdvisoryError> {
        let mut entry = self.collections.entry(collection.to_string()).or_default();
        for doc in docs {
            if let Some(&pos) = entry.index.get(&doc.id) {
                // Replacing an existing id keeps its insertion sequence.
                let seq = entry.docs[pos].seq;
                entry.docs[pos] = StoredDoc {
                    id: doc.id,
                    text: doc.text,
                    embedding: doc.embedding,
                    metadata: doc.metadata,
                    content_hash: doc.content_hash,
                    seq,
                };
            } else {
                let seq = entry.next_seq;
                entry.next_seq += 1;
                let id = doc.id.clone();
                entry.docs.push(StoredDoc {
                    id: doc.id,
                    text: doc.text,
                    embedding: doc.embedding,
                    metadata: doc.metadata,
                    content_hash: doc.content_hash,
                    seq,
                });
                let pos = entry.docs.len() - 1;
                entry.index.insert(id, pos);
            }
        }
        Ok(())
    }

    async fn query_nearest(
        &self,
        collection: &str,
        vector: &[f32],
        k: usize,
        filters: &[Filter],
    ) -> Result<Vec<(String, f32)>, AdvisoryError> {
        let Some(entry) = self.collections.get(collection) else {
            return Ok(vec![]);
        };

        let mut scored: Vec<(u64, String, f32)> = entry
            .docs
            .iter()
            .filter(|doc| doc.embedding.len() == vector.len())
            .filter(|doc| filters.iter().all(|f| f.matches(&doc.metadata)))
            .map(|doc| {
                (
                    doc.seq,
                    doc.id.clone(),
                    cosine_similarity(vector, &doc.embedding),
                )
            })
            .collect();

        // Descending similarity, ties by insertion order.
        scored.sort_by(|a, b| {
            b.2.partial_cmp(&a.2)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(k);

        Ok(scored.into_iter().map(|(_, id, score)| (id, score)).collect())
    }

    async fn get(
        &self,
        collection: &str,
        ids: &[String],
    ) -> Result<Vec<Document>, AdvisoryError> {
        let Some(entry) = self.collections.get(collection) else {
            return Ok(vec![]);
        };

        Ok(ids
            .iter()
            .filter_map(|id| entry.index.get(id).map(|&pos| &entry.docs[pos]))
            .map(|doc| Document {
                id: doc.id.clone(),
                content: doc.text.clone(),
                metadata: doc.metadata.clone(),
                content_hash: doc.content_hash.clone(),
                seq: doc.seq,
            })
            .collect())
    }

    async fn count(&self, collection: &str) -> Result<usize, AdvisoryError> {
        Ok(self
            .collections
            .get(collection)
            .map(|entry| entry.docs.len())
            .unwrap_or(0))
    }

    async fn drop_collection(&self, collection: &str) -> Result<(), AdvisoryError> {
        self.collections.remove(collection);
        Ok(())
    }
}
