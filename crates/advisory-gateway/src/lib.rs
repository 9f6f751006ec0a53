// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caching, cost-tracking gateway in front of a generation provider.

pub mod cache;
pub mod gateway;
pub mod ledger;
pub mod pricing;

pub use cache::{ResponseCache, cache_key};
pub use gateway::{CacheGateway, InvokeOutcome};
pub use ledger::{UsageLedger, UsageSnapshot};
