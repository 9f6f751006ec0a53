// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible HTTP provider for chat completions and embeddings.

pub mod client;
pub mod types;

pub use client::OpenAiClient;
