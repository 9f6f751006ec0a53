// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for the Advisory workspace: deterministic mocks for the
//! provider boundary and record fixtures.

pub mod mock_embedder;
pub mod mock_provider;
pub mod records;

pub use mock_embedder::MockEmbedder;
pub use mock_provider::{MockFailure, MockProvider};
pub use records::sample_records;
