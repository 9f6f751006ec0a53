// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rendering performance records into retrievable documents.
//!
//! Each record becomes a text block with creative, metrics, audience, and
//! derived headline-signal sections. The content hash is computed over the
//! normalized headline+body only, so cosmetic whitespace differences do not
//! defeat deduplication.

use advisory_core::types::{DocMetadata, PerformanceRecord};
use sha2::{Digest, Sha256};

/// Maximum body characters included in the rendered document.
const BODY_PREVIEW_CHARS: usize = 200;

/// Collapse runs of whitespace and lowercase, for hashing.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// SHA-256 hash of a record's normalized headline+body, hex encoded.
pub fn content_hash(record: &PerformanceRecord) -> String {
    let normalized = normalize_text(&format!("{}\n{}", record.headline, record.body));
    let digest = Sha256::digest(normalized.as_bytes());
    format!("{digest:x}")
}

/// Stable document id derived from the content hash.
pub fn document_id(hash: &str) -> String {
    format!("doc-{}", &hash[..16.min(hash.len())])
}

/// Render a record into the document text stored in the knowledge base.
pub fn render_record(record: &PerformanceRecord) -> String {
    let body_preview: String = record.body.chars().take(BODY_PREVIEW_CHARS).collect();
    let body_preview = if body_preview.is_empty() {
        "(none)".to_string()
    } else {
        body_preview
    };

    let headline = &record.headline;
    let has_digit = headline.chars().any(|c| c.is_ascii_digit());
    let has_question = headline.contains('?');

    format!(
        "High-performing ad creative\n\
         Headline: {headline}\n\
         Body: {body_preview}\n\
         CTA: {cta}\n\
         \n\
         Metrics\n\
         ROAS: {roas:.2}\n\
         CTR: {ctr:.2}%\n\
         Purchases: {purchases}\n\
         \n\
         Audience\n\
         Age: {age}\n\
         Gender: {gender}\n\
         \n\
         Headline signals\n\
         Length: {len} characters\n\
         Contains digit: {digit}\n\
         Contains question: {question}\n",
        cta = record.call_to_action,
        roas = record.roas,
        ctr = record.ctr,
        purchases = record.purchases,
        age = record.age,
        gender = record.gender,
        len = headline.chars().count(),
        digit = if has_digit { "yes" } else { "no" },
        question = if has_question { "yes" } else { "no" },
    )
}

/// Metadata stored alongside the rendered document.
pub fn record_metadata(record: &PerformanceRecord) -> DocMetadata {
    DocMetadata {
        record_type: "ad_creative".to_string(),
        headline: record.headline.clone(),
        call_to_action: record.call_to_action.clone(),
        roas: record.roas,
        ctr: record.ctr,
        purchases: record.purchases,
        age: record.age.clone(),
        gender: record.gender.clone(),
        source_id: record.source_id.clone(),
        created_at: chrono::Utc::now()
            .format("%Y-%m-%dT%H:%M:%S%.3fZ")
            .to_string(),
    }
}

/// The high-performer ingest predicate: ROAS at or above `threshold`.
pub fn roas_at_least(threshold: f64) -> impl Fn(&PerformanceRecord) -> bool {
    move |record| record.roas >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PerformanceRecord {
        PerformanceRecord {
            campaign: "Summer Sale".into(),
            headline: "Save 30% this weekend?".into(),
            body: "Limited stock across all categories.".into(),
            call_to_action: "SHOP_NOW".into(),
            spend: 1200.0,
            roas: 3.6,
            ctr: 2.4,
            purchases: 41,
            cpa: 29.3,
            age: "25-34".into(),
            gender: "female".into(),
            source_id: "row-3".into(),
        }
    }

    #[test]
    fn hash_ignores_whitespace_and_case() {
        let a = record();
        let mut b = record();
        b.headline = "  Save 30%   THIS weekend?".into();
        b.body = "Limited stock\nacross all   categories.".into();
        assert_eq!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn hash_differs_on_content() {
        let a = record();
        let mut b = record();
        b.headline = "Free shipping today".into();
        assert_ne!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn render_includes_headline_signals() {
        let text = render_record(&record());
        assert!(text.contains("Headline: Save 30% this weekend?"));
        assert!(text.contains("Contains digit: yes"));
        assert!(text.contains("Contains question: yes"));
        assert!(text.contains("ROAS: 3.60"));
    }

    #[test]
    fn body_is_truncated() {
        let mut r = record();
        r.body = "x".repeat(500);
        let text = render_record(&r);
        assert!(text.contains(&"x".repeat(200)));
        assert!(!text.contains(&"x".repeat(201)));
    }

    #[test]
    fn roas_predicate_is_inclusive() {
        let predicate = roas_at_least(3.0);
        let mut r = record();
        r.roas = 3.0;
        assert!(predicate(&r));
        r.roas = 2.99;
        assert!(!predicate(&r));
    }
}
