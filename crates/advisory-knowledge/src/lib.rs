// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic knowledge base over historical ad performance records.
//!
//! Provides ingest with content-hash deduplication, versioned collections
//! with atomic rebuild swaps, similarity retrieval with metadata filters,
//! and an in-memory vector store implementation.
//!
//! ## Architecture
//!
//! - **KnowledgeStore**: predicate filter, normalize, dedupe, batch embed,
//!   upsert; copy-on-write collection versions
//! - **Retriever**: query embedding + nearest-neighbor search + prompt
//!   context formatting
//! - **MemoryVectorStore**: insertion-ordered in-memory [`VectorStore`]
//!   with cosine scoring
//!
//! [`VectorStore`]: advisory_core::traits::VectorStore

pub mod document;
pub mod memory_store;
pub mod retriever;
pub mod store;

pub use document::roas_at_least;
pub use memory_store::{MemoryVectorStore, cosine_similarity};
pub use retriever::Retriever;
pub use store::{IngestReport, KnowledgeStore};
