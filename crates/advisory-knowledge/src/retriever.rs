// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Similarity search over a knowledge store collection.
//!
//! The retriever embeds the query, asks the vector store for nearest
//! neighbors under metadata filters, and returns documents ordered by
//! descending cosine similarity with ties broken by insertion order.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use advisory_core::error::AdvisoryError;
use advisory_core::types::{Document, Filter};

use crate::store::KnowledgeStore;

/// Read-side companion to [`KnowledgeStore`].
pub struct Retriever {
    knowledge: Arc<KnowledgeStore>,
}

impl Retriever {
    pub fn new(knowledge: Arc<KnowledgeStore>) -> Self {
        Self { knowledge }
    }

    /// Search `collection` for the `k` documents most similar to `query`
    /// among those matching every filter.
    ///
    /// `k` is clamped to the collection size. An empty collection or zero
    /// matches yields an empty list; a collection that was never built is
    /// [`AdvisoryError::RagUnavailable`] so the caller can decide whether
    /// to proceed without retrieval context.
    pub async fn search(
        &self,
        collection: &str,
        query: &str,
        k: usize,
        filters: &[Filter],
    ) -> Result<Vec<(Document, f32)>, AdvisoryError> {
        let (store_collection, len) =
            self.knowledge.resolve(collection).ok_or_else(|| {
                AdvisoryError::RagUnavailable(format!(
                    "collection '{collection}' has not been built"
                ))
            })?;

        let k = k.min(len);
        if k == 0 {
            return Ok(vec![]);
        }

        let embedding = self.knowledge.embed_query(query).await?;

        let deadline = self.knowledge.config().embed_timeout();
        let hits = match tokio::time::timeout(
            deadline,
            self.knowledge
                .vector_store()
                .query_nearest(&store_collection, &embedding, k, filters),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => return Err(AdvisoryError::Timeout { duration: deadline }),
        };

        if hits.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<String> = hits.iter().map(|(id, _)| id.clone()).collect();
        let documents = self
            .knowledge
            .vector_store()
            .get(&store_collection, &ids)
            .await?;

        debug!(
            collection,
            query_len = query.len(),
            requested = k,
            returned = documents.len(),
            "similarity search complete"
        );

        // `get` omits unknown ids, so pair scores back by id rather than
        // by position.
        let mut by_id: HashMap<String, Document> = documents
            .into_iter()
            .map(|doc| (doc.id.clone(), doc))
            .collect();
        Ok(hits
            .into_iter()
            .filter_map(|(id, score)| by_id.remove(&id).map(|doc| (doc, score)))
            .collect())
    }

    /// Format the top `k` hits into a prompt block of reference cases.
    ///
    /// Returns an empty string when nothing relevant is found.
    pub async fn context_for_generation(
        &self,
        collection: &str,
        query: &str,
        k: usize,
    ) -> Result<String, AdvisoryError> {
        let hits = self.search(collection, query, k, &[]).await?;
        if hits.is_empty() {
            return Ok(String::new());
        }

        let mut context = String::from("Reference cases from past high performers:\n\n");
        for (i, (doc, _score)) in hits.iter().enumerate() {
            context.push_str(&format!(
                "### Case {n} (ROAS {roas:.2})\n{content}\n---\n\n",
                n = i + 1,
                roas = doc.metadata.roas,
                content = doc.content,
            ));
        }
        Ok(context)
    }
}
