// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic keyword-based intent classification.
//!
//! The optimization and copywriting tasks carry a fixed intent; only the
//! conversational task inspects the user message. Classification never
//! calls the model, so it costs nothing and cannot fail.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::result::TaskKind;

/// What the user is trying to do, as understood by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    QueryData,
    Analyze,
    Recommend,
    GenerateCopy,
    Optimize,
    Chat,
}

impl Intent {
    /// Intent for a task request. Fixed for the single-purpose tasks,
    /// keyword-classified for conversational ones.
    pub fn for_task(task: TaskKind, user_message: &str) -> Intent {
        match task {
            TaskKind::Optimization => Intent::Optimize,
            TaskKind::Copywriting => Intent::GenerateCopy,
            TaskKind::Conversational => classify_message(user_message),
        }
    }
}

/// Classify a free-form user message. First matching group wins; the
/// groups are ordered from most to least specific.
pub fn classify_message(message: &str) -> Intent {
    let text = message.to_lowercase();
    let contains_any = |keywords: &[&str]| keywords.iter().any(|kw| text.contains(kw));

    if contains_any(&["copy", "headline", "write", "draft", "variant", "creative"]) {
        Intent::GenerateCopy
    } else if contains_any(&["optimiz", "budget", "scale", "improve", "reallocat"]) {
        Intent::Optimize
    } else if contains_any(&["analy", "compare", "why", "trend", "breakdown"]) {
        Intent::Analyze
    } else if contains_any(&["recommend", "suggest", "should i", "advice", "what next"]) {
        Intent::Recommend
    } else if contains_any(&["how much", "spend", "roas", "ctr", "show", "performance", "top"]) {
        Intent::QueryData
    } else {
        Intent::Chat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_purpose_tasks_have_fixed_intents() {
        assert_eq!(
            Intent::for_task(TaskKind::Optimization, "anything"),
            Intent::Optimize
        );
        assert_eq!(
            Intent::for_task(TaskKind::Copywriting, "anything"),
            Intent::GenerateCopy
        );
    }

    #[test]
    fn conversational_messages_are_keyword_classified() {
        assert_eq!(
            classify_message("Write me three new headlines"),
            Intent::GenerateCopy
        );
        assert_eq!(
            classify_message("How should we reallocate the budget?"),
            Intent::Optimize
        );
        assert_eq!(
            classify_message("Analyze last week against this week"),
            Intent::Analyze
        );
        assert_eq!(
            classify_message("Any advice on the retargeting campaign?"),
            Intent::Recommend
        );
        assert_eq!(
            classify_message("Show me the top campaigns by ROAS"),
            Intent::QueryData
        );
        assert_eq!(classify_message("good morning"), Intent::Chat);
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(classify_message("WRITE A HEADLINE"), Intent::GenerateCopy);
    }
}
