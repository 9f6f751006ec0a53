// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector store trait.

use async_trait::async_trait;

use crate::error::AdvisoryError;
use crate::types::{Document, Filter, UpsertDocument};

/// Persists embeddings plus metadata and answers nearest-neighbor queries.
///
/// Collections are named by the caller; the knowledge store uses versioned
/// names (`logical-name/<version>`) so a rebuild lands in a fresh
/// collection and the old one is dropped after the swap. The on-disk
/// layout is owned by the implementation.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Inserts or replaces documents in a collection, creating it on first
    /// use. Replacing an existing id keeps its insertion sequence.
    async fn upsert(
        &self,
        collection: &str,
        docs: Vec<UpsertDocument>,
    ) -> Result<(), AdvisoryError>;

    /// Returns up to `k` `(doc_id, cosine_similarity)` pairs for documents
    /// matching every filter, ordered by descending similarity with ties
    /// broken by insertion order.
    async fn query_nearest(
        &self,
        collection: &str,
        vector: &[f32],
        k: usize,
        filters: &[Filter],
    ) -> Result<Vec<(String, f32)>, AdvisoryError>;

    /// Fetches documents by id, in the order the ids were given. Unknown
    /// ids are silently omitted.
    async fn get(
        &self,
        collection: &str,
        ids: &[String],
    ) -> Result<Vec<Document>, AdvisoryError>;

    /// Number of documents in a collection (0 if it does not exist).
    async fn count(&self, collection: &str) -> Result<usize, AdvisoryError>;

    /// Removes a collection and all its documents. Dropping a collection
    /// that does not exist is not an error.
    async fn drop_collection(&self, collection: &str) -> Result<(), AdvisoryError>;
}
