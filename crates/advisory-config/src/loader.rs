// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Merge order: compiled defaults, then an optional TOML file, then
//! `ADVISORY_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::AdvisoryConfig;

/// Load configuration from a TOML file with env var overrides.
///
/// A missing file is not an error; defaults plus environment apply.
pub fn load_config(path: &Path) -> Result<AdvisoryConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AdvisoryConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Load configuration from an inline TOML string only (no env lookup).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<AdvisoryConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AdvisoryConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `ADVISORY_GATEWAY_TTL_SECONDS` must map
/// to `gateway.ttl_seconds`, not `gateway.ttl.seconds`.
fn env_provider() -> Env {
    Env::prefixed("ADVISORY_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("gateway_", "gateway.", 1)
            .replacen("knowledge_", "knowledge.", 1)
            .replacen("agent_", "agent.", 1)
            .replacen("provider_", "provider.", 1);
        mapped.into()
    })
}
