// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Advisory gateway.
//!
//! TOML configuration with environment variable overrides, strict unknown
//! key rejection, and per-field defaults.

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_str};
pub use model::{
    AdvisoryConfig, AgentConfig, GatewayConfig, KnowledgeConfig, ProviderConfig,
};
