// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock embedding provider producing deterministic vectors.
//!
//! Each text maps to a unit vector derived from its SHA-256 digest, so the
//! same text always embeds identically and distinct texts almost always
//! differ. Failure injection covers both the per-record and the
//! whole-provider outage paths of ingest.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use advisory_core::error::AdvisoryError;
use advisory_core::traits::EmbeddingProvider;

/// Deterministic hash-based embedding provider.
pub struct MockEmbedder {
    dim: usize,
    fail_substrings: Mutex<Vec<String>>,
    fail_all: AtomicBool,
    calls: AtomicU64,
}

impl MockEmbedder {
    /// Create an embedder producing `dim`-dimensional unit vectors.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            fail_substrings: Mutex::new(Vec::new()),
            fail_all: AtomicBool::new(false),
            calls: AtomicU64::new(0),
        }
    }

    /// Fail any embed call whose input contains `marker`.
    ///
    /// A batch containing a poisoned text errors as a whole; callers that
    /// fall back to per-record embedding then lose only that record.
    pub fn fail_on(&self, marker: impl Into<String>) {
        self.fail_substrings
            .lock()
            .expect("mock embedder lock")
            .push(marker.into());
    }

    /// Make every embed call fail as a whole-provider outage.
    pub fn fail_all(&self) {
        self.fail_all.store(true, Ordering::SeqCst);
    }

    /// Number of `embed` calls made so far.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let digest = Sha256::digest(text.as_bytes());
        let mut v: Vec<f32> = digest
            .iter()
            .cycle()
            .take(self.dim)
            .map(|&b| (b as f32 / 255.0) - 0.5)
            .collect();

        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm == 0.0 {
            v[0] = 1.0;
        } else {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AdvisoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_all.load(Ordering::SeqCst) {
            return Err(AdvisoryError::ProviderUnavailable(
                "mock embedder offline".to_string(),
            ));
        }

        let markers = self.fail_substrings.lock().expect("mock embedder lock");
        for text in texts {
            if let Some(marker) = markers.iter().find(|m| text.contains(m.as_str())) {
                return Err(AdvisoryError::Internal(format!(
                    "mock embedding failure for input containing '{marker}'"
                )));
            }
        }
        drop(markers);

        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_text_embeds_identically() {
        let embedder = MockEmbedder::new(8);
        let a = embedder.embed(&["hello".to_string()]).await.unwrap();
        let b = embedder.embed(&["hello".to_string()]).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].len(), 8);
    }

    #[tokio::test]
    async fn vectors_are_unit_length() {
        let embedder = MockEmbedder::new(16);
        let v = embedder.embed(&["some text".to_string()]).await.unwrap();
        let norm: f32 = v[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn poisoned_batch_fails_whole_call() {
        let embedder = MockEmbedder::new(8);
        embedder.fail_on("bad");
        let err = embedder
            .embed(&["fine".to_string(), "bad apple".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, AdvisoryError::Internal(_)));
    }
}
