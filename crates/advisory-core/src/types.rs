// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Advisory workspace.

use serde::{Deserialize, Serialize};

/// One row of advertising performance data, already typed and cleaned by
/// the dashboard's loader before it reaches the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    /// Campaign the ad belongs to.
    pub campaign: String,
    /// Ad headline.
    pub headline: String,
    /// Primary ad text.
    pub body: String,
    /// Call-to-action type (e.g. "SHOP_NOW").
    pub call_to_action: String,
    /// Total spend for this row, in the account currency.
    pub spend: f64,
    /// Purchase return on ad spend.
    pub roas: f64,
    /// Click-through rate, in percent.
    pub ctr: f64,
    /// Number of attributed purchases.
    pub purchases: u64,
    /// Cost per purchase.
    pub cpa: f64,
    /// Audience age bucket (e.g. "25-34").
    pub age: String,
    /// Audience gender segment.
    pub gender: String,
    /// Identifier of the source row in the upstream spreadsheet.
    pub source_id: String,
}

/// Metadata stored alongside an ingested document and used for filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocMetadata {
    /// Document category (e.g. "ad_creative").
    pub record_type: String,
    pub headline: String,
    pub call_to_action: String,
    pub roas: f64,
    pub ctr: f64,
    pub purchases: u64,
    pub age: String,
    pub gender: String,
    pub source_id: String,
    /// ISO 8601 ingest timestamp.
    pub created_at: String,
}

impl DocMetadata {
    /// Look up a numeric metadata field by name.
    pub fn numeric_field(&self, name: &str) -> Option<f64> {
        match name {
            "roas" => Some(self.roas),
            "ctr" => Some(self.ctr),
            "purchases" => Some(self.purchases as f64),
            _ => None,
        }
    }

    /// Look up a text metadata field by name.
    pub fn text_field(&self, name: &str) -> Option<&str> {
        match name {
            "record_type" => Some(&self.record_type),
            "headline" => Some(&self.headline),
            "call_to_action" => Some(&self.call_to_action),
            "age" => Some(&self.age),
            "gender" => Some(&self.gender),
            "source_id" => Some(&self.source_id),
            _ => None,
        }
    }
}

/// An equality or range predicate over document metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    /// Text field equals the given value.
    Eq { field: String, value: String },
    /// Numeric field is at least the given value.
    Gte { field: String, value: f64 },
    /// Numeric field is at most the given value.
    Lte { field: String, value: f64 },
}

impl Filter {
    /// Whether the given metadata satisfies this predicate.
    ///
    /// A filter naming an unknown field matches nothing.
    pub fn matches(&self, metadata: &DocMetadata) -> bool {
        match self {
            Filter::Eq { field, value } => {
                metadata.text_field(field).is_some_and(|v| v == value)
            }
            Filter::Gte { field, value } => {
                metadata.numeric_field(field).is_some_and(|v| v >= *value)
            }
            Filter::Lte { field, value } => {
                metadata.numeric_field(field).is_some_and(|v| v <= *value)
            }
        }
    }
}

/// One ingested performance record turned into retrievable text.
///
/// Immutable after ingest; replaced only by a full collection rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Stable document identifier within its collection.
    pub id: String,
    /// Rendered text content.
    pub content: String,
    pub metadata: DocMetadata,
    /// SHA-256 hash of the normalized content, unique within a collection.
    pub content_hash: String,
    /// Insertion sequence number, used as the deterministic tie-breaker
    /// when similarity scores are equal.
    pub seq: u64,
}

/// A document plus its embedding, as handed to a [`VectorStore`] upsert.
///
/// [`VectorStore`]: crate::traits::VectorStore
#[derive(Debug, Clone)]
pub struct UpsertDocument {
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
    pub metadata: DocMetadata,
    pub content_hash: String,
}

/// Token counts reported by a generation provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    /// Total tokens consumed by the call.
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// A request to a text-generation provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model identifier. Empty string means "use the configured default".
    pub model: String,
    /// Optional system prompt.
    pub system_prompt: Option<String>,
    /// User prompt text.
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl GenerationRequest {
    /// A request with the workspace defaults for everything but the prompt.
    pub fn for_prompt(prompt: impl Into<String>) -> Self {
        Self {
            model: String::new(),
            system_prompt: None,
            prompt: prompt.into(),
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

/// A response from a text-generation provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub text: String,
    pub usage: TokenUsage,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> DocMetadata {
        DocMetadata {
            record_type: "ad_creative".into(),
            headline: "50% off this week".into(),
            call_to_action: "SHOP_NOW".into(),
            roas: 3.4,
            ctr: 2.1,
            purchases: 12,
            age: "25-34".into(),
            gender: "female".into(),
            source_id: "row-17".into(),
            created_at: "2026-08-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn range_filters_match_numeric_fields() {
        let m = metadata();
        assert!(
            Filter::Gte {
                field: "roas".into(),
                value: 3.0
            }
            .matches(&m)
        );
        assert!(
            !Filter::Gte {
                field: "roas".into(),
                value: 4.0
            }
            .matches(&m)
        );
        assert!(
            Filter::Lte {
                field: "ctr".into(),
                value: 2.1
            }
            .matches(&m)
        );
    }

    #[test]
    fn eq_filter_matches_text_fields() {
        let m = metadata();
        assert!(
            Filter::Eq {
                field: "gender".into(),
                value: "female".into()
            }
            .matches(&m)
        );
        assert!(
            !Filter::Eq {
                field: "gender".into(),
                value: "male".into()
            }
            .matches(&m)
        );
    }

    #[test]
    fn unknown_field_matches_nothing() {
        let m = metadata();
        assert!(
            !Filter::Gte {
                field: "impressions".into(),
                value: 0.0
            }
            .matches(&m)
        );
        assert!(
            !Filter::Eq {
                field: "impressions".into(),
                value: "1".into()
            }
            .matches(&m)
        );
    }

    #[test]
    fn token_usage_total() {
        let usage = TokenUsage {
            prompt_tokens: 120,
            completion_tokens: 80,
        };
        assert_eq!(usage.total(), 200);
    }
}
