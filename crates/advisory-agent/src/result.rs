// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed agent tasks and their result payloads.
//!
//! One result type per task; the runtime never hands raw model JSON to
//! the dashboard without it having passed through these types first.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::intent::Intent;

/// The agent workflows the dashboard can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Account health review with urgent actions and opportunities.
    Optimization,
    /// Ad copy variant generation.
    Copywriting,
    /// Free-form chat with data-backed answers.
    Conversational,
}

/// Priority label for an optimization action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// One recommended action in an optimization report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationAction {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    /// The KPI the action targets (e.g. "roas", "cpa").
    pub metric: String,
    #[serde(default)]
    pub campaigns: Vec<String>,
}

/// Structured output of the optimization task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    /// Account health score, 0 to 100.
    pub health_score: i64,
    pub overall_status: String,
    pub key_insights: Vec<String>,
    pub urgent_actions: Vec<OptimizationAction>,
    pub opportunities: Vec<OptimizationAction>,
    pub next_steps: Vec<String>,
}

/// One generated ad copy variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopywritingDraft {
    pub headline: String,
    pub primary_text: String,
    pub cta: String,
    pub tone: String,
    pub key_message: String,
}

/// Structured output of the copywriting task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopywritingResult {
    pub variants: Vec<CopywritingDraft>,
    pub strategy_explanation: String,
    pub ab_test_suggestions: Vec<String>,
}

/// Structured output of the conversational task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationalReply {
    pub message: String,
    #[serde(default)]
    pub action_taken: Option<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Validated payload of one agent run, tagged by task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TaskPayload {
    Optimization(OptimizationReport),
    Copywriting(CopywritingResult),
    Conversational(ConversationalReply),
}

impl TaskPayload {
    /// Follow-up suggestions carried by the payload, if any.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            TaskPayload::Optimization(report) => report.next_steps.clone(),
            TaskPayload::Copywriting(result) => result.ab_test_suggestions.clone(),
            TaskPayload::Conversational(reply) => reply.suggestions.clone(),
        }
    }

    /// The user-facing text of the payload, used for the assistant turn
    /// recorded in the conversation state.
    pub fn display_text(&self) -> String {
        match self {
            TaskPayload::Optimization(report) => report.overall_status.clone(),
            TaskPayload::Copywriting(result) => result.strategy_explanation.clone(),
            TaskPayload::Conversational(reply) => reply.message.clone(),
        }
    }
}

/// Immutable outcome of one agent invocation.
#[derive(Debug, Clone, Serialize)]
pub struct AgentResult {
    pub task: TaskKind,
    /// `None` when validation never succeeded; `raw_text` then carries the
    /// best-effort final model output.
    pub payload: Option<TaskPayload>,
    pub raw_text: String,
    pub valid: bool,
    /// Number of validation failures encountered before the final outcome.
    pub retry_count: u32,
    pub intent: Intent,
    pub suggestions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_kind_round_trips_through_strings() {
        use std::str::FromStr;
        for task in [
            TaskKind::Optimization,
            TaskKind::Copywriting,
            TaskKind::Conversational,
        ] {
            assert_eq!(TaskKind::from_str(&task.to_string()).unwrap(), task);
        }
        assert!(TaskKind::from_str("daily_check").is_err());
    }

    #[test]
    fn priority_deserializes_lowercase_only() {
        assert_eq!(
            serde_json::from_str::<Priority>("\"high\"").unwrap(),
            Priority::High
        );
        assert!(serde_json::from_str::<Priority>("\"HIGH\"").is_err());
        assert!(serde_json::from_str::<Priority>("\"urgent\"").is_err());
    }

    #[test]
    fn payload_suggestions_come_from_the_task_specific_field() {
        let reply = TaskPayload::Conversational(ConversationalReply {
            message: "hi".into(),
            action_taken: None,
            suggestions: vec!["check ROAS".into()],
        });
        assert_eq!(reply.suggestions(), vec!["check ROAS".to_string()]);
    }
}
