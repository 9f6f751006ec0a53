// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Performance record fixtures.

use advisory_core::types::PerformanceRecord;

/// Generate `n` distinct records with ROAS alternating one above and one
/// below `base_roas` (even indices high, odd indices low).
///
/// Generation is index-deterministic: `sample_records(10, x)` equals the
/// first ten of `sample_records(90, x)`, which tests rely on for building
/// duplicate batches.
pub fn sample_records(n: usize, base_roas: f64) -> Vec<PerformanceRecord> {
    (0..n)
        .map(|i| PerformanceRecord {
            campaign: format!("Campaign {}", i % 5),
            headline: format!("Headline {i}: save {} percent", 10 + i),
            body: format!("Body copy for ad {i} with a concrete offer."),
            call_to_action: "SHOP_NOW".to_string(),
            spend: 100.0 + i as f64 * 10.0,
            roas: if i % 2 == 0 {
                base_roas + 1.0
            } else {
                base_roas - 1.0
            },
            ctr: 1.0 + (i % 10) as f64 * 0.3,
            purchases: (i as u64 % 7) + 1,
            cpa: 25.0 + (i % 4) as f64,
            age: if i % 2 == 0 { "25-34" } else { "35-44" }.to_string(),
            gender: match i % 3 {
                0 => "female",
                1 => "male",
                _ => "all",
            }
            .to_string(),
            source_id: format!("row-{i}"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_stable() {
        let long = sample_records(90, 4.0);
        assert_eq!(sample_records(10, 4.0), long[..10]);
    }

    #[test]
    fn roas_alternates_around_base() {
        let records = sample_records(4, 4.0);
        assert_eq!(records[0].roas, 5.0);
        assert_eq!(records[1].roas, 3.0);
        assert_eq!(records[2].roas, 5.0);
        assert_eq!(records[3].roas, 3.0);
    }
}
