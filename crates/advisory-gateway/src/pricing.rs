// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost estimation from the configured per-model rate table.
//!
//! Rates are keyed by model-name substring; the longest matching key wins
//! so "gpt-4o-mini" can carry a cheaper rate than the "gpt-4" family it
//! also matches. Unknown models fall back to a default rate so cost
//! tracking never silently drops calls.

use std::collections::BTreeMap;

/// USD-per-1k-tokens rate for `model`.
pub fn rate_for(cost_table: &BTreeMap<String, f64>, default_per_1k: f64, model: &str) -> f64 {
    cost_table
        .iter()
        .filter(|(key, _)| model.contains(key.as_str()))
        .max_by_key(|(key, _)| key.len())
        .map(|(_, rate)| *rate)
        .unwrap_or(default_per_1k)
}

/// Estimated cost in USD for `tokens` tokens on `model`.
pub fn cost_usd(
    cost_table: &BTreeMap<String, f64>,
    default_per_1k: f64,
    model: &str,
    tokens: u32,
) -> f64 {
    tokens as f64 * rate_for(cost_table, default_per_1k, model) / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("gpt-4".to_string(), 0.015),
            ("gpt-4o-mini".to_string(), 0.0006),
            ("gpt-5".to_string(), 0.0004),
        ])
    }

    #[test]
    fn longest_substring_key_wins() {
        let t = table();
        assert_eq!(rate_for(&t, 0.0005, "gpt-4-turbo"), 0.015);
        assert_eq!(rate_for(&t, 0.0005, "gpt-4o-mini-2024"), 0.0006);
        assert_eq!(rate_for(&t, 0.0005, "gpt-5-nano"), 0.0004);
    }

    #[test]
    fn unknown_model_falls_back_to_default() {
        assert_eq!(rate_for(&table(), 0.0005, "llama-70b"), 0.0005);
    }

    #[test]
    fn cost_scales_with_tokens() {
        let t = table();
        // 2000 tokens at $0.015/1k = $0.03
        let cost = cost_usd(&t, 0.0005, "gpt-4", 2000);
        assert!((cost - 0.03).abs() < 1e-12);
    }
}
