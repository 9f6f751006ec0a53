// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider-boundary trait definitions.
//!
//! The core never implements network providers itself; it calls them
//! through these `#[async_trait]` object-safe traits.

pub mod embedding;
pub mod provider;
pub mod vector_store;

pub use embedding::EmbeddingProvider;
pub use provider::GenerationProvider;
pub use vector_store::VectorStore;
