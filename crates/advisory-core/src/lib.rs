// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Advisory LLM gateway.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Advisory workspace. The provider
//! boundary (embedding, generation, vector storage) is expressed as traits
//! defined here and implemented elsewhere.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::AdvisoryError;
pub use traits::{EmbeddingProvider, GenerationProvider, VectorStore};
pub use types::{
    DocMetadata, Document, Filter, GenerationRequest, GenerationResponse,
    PerformanceRecord, TokenUsage, UpsertDocument,
};
