// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema validation of raw model output.
//!
//! Parse-then-validate: the text is parsed as JSON (tolerating markdown
//! code fences), deserialized into the task's typed payload, then checked
//! for the constraints serde cannot express. Every failure message is
//! written to work as the correction hint fed back on a retry.

use serde_json::Value;

use advisory_core::error::AdvisoryError;

use crate::result::{
    ConversationalReply, CopywritingResult, OptimizationReport, TaskKind, TaskPayload,
};

/// Validate raw model output against the task's expected shape.
pub fn validate(task: TaskKind, raw_text: &str) -> Result<TaskPayload, AdvisoryError> {
    let stripped = strip_code_fences(raw_text);
    let value: Value = serde_json::from_str(stripped).map_err(|e| {
        AdvisoryError::Validation(format!("the response is not valid JSON ({e})"))
    })?;

    match task {
        TaskKind::Optimization => {
            let report: OptimizationReport = from_value(value)?;
            if !(0..=100).contains(&report.health_score) {
                return Err(AdvisoryError::Validation(format!(
                    "health_score must be between 0 and 100, got {}",
                    report.health_score
                )));
            }
            Ok(TaskPayload::Optimization(report))
        }
        TaskKind::Copywriting => {
            let result: CopywritingResult = from_value(value)?;
            if result.variants.is_empty() {
                return Err(AdvisoryError::Validation(
                    "variants must contain at least one ad copy variant".to_string(),
                ));
            }
            Ok(TaskPayload::Copywriting(result))
        }
        TaskKind::Conversational => {
            let reply: ConversationalReply = from_value(value)?;
            if reply.message.trim().is_empty() {
                return Err(AdvisoryError::Validation(
                    "message must not be empty".to_string(),
                ));
            }
            Ok(TaskPayload::Conversational(reply))
        }
    }
}

fn from_value<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, AdvisoryError> {
    serde_json::from_value(value).map_err(|e| {
        AdvisoryError::Validation(format!("the JSON does not match the required shape: {e}"))
    })
}

/// Strip a surrounding markdown code fence, if any. Models frequently
/// wrap JSON in ```json blocks despite instructions not to.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => return trimmed,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::Priority;

    const CONVERSATIONAL_OK: &str = r#"{
        "message": "Overall ROAS is 3.2 across 5 campaigns.",
        "action_taken": "queried overall summary",
        "suggestions": ["Look at Campaign 2's CTR"]
    }"#;

    #[test]
    fn valid_conversational_reply_passes() {
        let payload = validate(TaskKind::Conversational, CONVERSATIONAL_OK).unwrap();
        let TaskPayload::Conversational(reply) = payload else {
            panic!("wrong payload variant");
        };
        assert!(reply.message.contains("3.2"));
        assert_eq!(reply.suggestions.len(), 1);
    }

    #[test]
    fn code_fenced_json_is_accepted() {
        let fenced = format!("```json\n{CONVERSATIONAL_OK}\n```");
        assert!(validate(TaskKind::Conversational, &fenced).is_ok());
    }

    #[test]
    fn non_json_is_rejected_with_a_usable_hint() {
        let err = validate(TaskKind::Conversational, "sure, here you go!").unwrap_err();
        let AdvisoryError::Validation(msg) = err else {
            panic!("expected validation error");
        };
        assert!(msg.contains("not valid JSON"));
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let err = validate(TaskKind::Conversational, r#"{"suggestions": []}"#).unwrap_err();
        assert!(matches!(err, AdvisoryError::Validation(_)));
    }

    #[test]
    fn empty_message_is_rejected() {
        let err =
            validate(TaskKind::Conversational, r#"{"message": "   "}"#).unwrap_err();
        let AdvisoryError::Validation(msg) = err else {
            panic!("expected validation error");
        };
        assert!(msg.contains("message"));
    }

    #[test]
    fn priority_outside_the_allowed_set_is_rejected() {
        let raw = r#"{
            "health_score": 70,
            "overall_status": "ok",
            "key_insights": [],
            "urgent_actions": [{"title": "t", "description": "d", "priority": "urgent", "metric": "roas"}],
            "opportunities": [],
            "next_steps": []
        }"#;
        let err = validate(TaskKind::Optimization, raw).unwrap_err();
        assert!(matches!(err, AdvisoryError::Validation(_)));
    }

    #[test]
    fn health_score_must_stay_in_range() {
        let raw = r#"{
            "health_score": 140,
            "overall_status": "ok",
            "key_insights": [],
            "urgent_actions": [],
            "opportunities": [],
            "next_steps": []
        }"#;
        let err = validate(TaskKind::Optimization, raw).unwrap_err();
        let AdvisoryError::Validation(msg) = err else {
            panic!("expected validation error");
        };
        assert!(msg.contains("health_score"));
    }

    #[test]
    fn valid_optimization_report_passes() {
        let raw = r#"{
            "health_score": 72,
            "overall_status": "Healthy with two weak campaigns",
            "key_insights": ["Campaign 3 drags down average ROAS"],
            "urgent_actions": [{"title": "Pause Campaign 3", "description": "ROAS 0.8", "priority": "high", "metric": "roas", "campaigns": ["Campaign 3"]}],
            "opportunities": [],
            "next_steps": ["Shift budget to Campaign 0"]
        }"#;
        let TaskPayload::Optimization(report) =
            validate(TaskKind::Optimization, raw).unwrap()
        else {
            panic!("wrong payload variant");
        };
        assert_eq!(report.urgent_actions[0].priority, Priority::High);
        assert_eq!(report.health_score, 72);
    }

    #[test]
    fn copywriting_requires_at_least_one_variant() {
        let raw = r#"{
            "variants": [],
            "strategy_explanation": "n/a",
            "ab_test_suggestions": []
        }"#;
        let err = validate(TaskKind::Copywriting, raw).unwrap_err();
        let AdvisoryError::Validation(msg) = err else {
            panic!("expected validation error");
        };
        assert!(msg.contains("variants"));
    }

    #[test]
    fn null_list_fields_are_rejected() {
        let raw = r#"{
            "variants": null,
            "strategy_explanation": "n/a",
            "ab_test_suggestions": []
        }"#;
        assert!(validate(TaskKind::Copywriting, raw).is_err());
    }

    #[test]
    fn fence_without_info_string_is_stripped() {
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }
}
