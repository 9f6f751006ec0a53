// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt and context assembly for agent requests.
//!
//! The prompt is built from fixed task instructions, the expected JSON
//! shape, tool outputs, optional retrieved context, conversation history,
//! and, on a retry, a correction hint describing the prior validation
//! failure.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::result::TaskKind;

/// System prompt for a task.
pub fn system_prompt(task: TaskKind) -> &'static str {
    match task {
        TaskKind::Optimization => {
            "You are an advertising performance advisor. Review the account \
             data provided by the analysis tools and produce concrete, \
             prioritized optimization guidance. Ground every claim in the \
             tool output. Reply with a single JSON object and nothing else."
        }
        TaskKind::Copywriting => {
            "You are an advertising copywriter. Use the provided top \
             performers and reference cases to draft distinct ad copy \
             variants. Reply with a single JSON object and nothing else."
        }
        TaskKind::Conversational => {
            "You are an advertising assistant answering an analyst's \
             question. Base every answer on the tool output; do not invent \
             numbers. Reply with a single JSON object and nothing else."
        }
    }
}

/// The JSON shape the model must produce for a task. Doubles as the
/// contract the validator enforces.
pub fn schema_block(task: TaskKind) -> &'static str {
    match task {
        TaskKind::Optimization => {
            r#"Respond with JSON matching exactly:
{
  "health_score": <integer 0-100>,
  "overall_status": "<one sentence>",
  "key_insights": ["<insight>", ...],
  "urgent_actions": [{"title": "...", "description": "...", "priority": "high|medium|low", "metric": "...", "campaigns": ["..."]}],
  "opportunities": [{"title": "...", "description": "...", "priority": "high|medium|low", "metric": "...", "campaigns": ["..."]}],
  "next_steps": ["<step>", ...]
}"#
        }
        TaskKind::Copywriting => {
            r#"Respond with JSON matching exactly:
{
  "variants": [{"headline": "...", "primary_text": "...", "cta": "...", "tone": "...", "key_message": "..."}],
  "strategy_explanation": "<why these angles>",
  "ab_test_suggestions": ["<what to test>", ...]
}
"variants" must contain at least one entry."#
        }
        TaskKind::Conversational => {
            r#"Respond with JSON matching exactly:
{
  "message": "<your reply to the user>",
  "action_taken": "<what you did, or null>",
  "suggestions": ["<follow-up suggestion>", ...]
}"#
        }
    }
}

/// Assemble the final user prompt for one LLM attempt.
pub fn build_prompt(
    task: TaskKind,
    user_message: &str,
    history: &str,
    tool_outputs: &BTreeMap<String, Value>,
    retrieved_context: &str,
    correction: Option<&str>,
) -> String {
    let mut prompt = String::new();

    if !history.is_empty() {
        prompt.push_str(history);
        prompt.push('\n');
    }

    prompt.push_str("User request: ");
    prompt.push_str(user_message);
    prompt.push_str("\n\nTool output:\n");
    for (name, output) in tool_outputs {
        prompt.push_str(&format!(
            "## {name}\n{}\n",
            serde_json::to_string_pretty(output).unwrap_or_else(|_| output.to_string())
        ));
    }

    if !retrieved_context.is_empty() {
        prompt.push('\n');
        prompt.push_str(retrieved_context);
    }

    prompt.push('\n');
    prompt.push_str(schema_block(task));

    if let Some(hint) = correction {
        prompt.push_str("\n\nCorrection: ");
        prompt.push_str(hint);
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prompt_contains_tool_outputs_in_name_order() {
        let mut outputs = BTreeMap::new();
        outputs.insert("zeta".to_string(), json!({"b": 2}));
        outputs.insert("alpha".to_string(), json!({"a": 1}));
        let prompt = build_prompt(
            TaskKind::Conversational,
            "how are we doing",
            "",
            &outputs,
            "",
            None,
        );
        let alpha = prompt.find("## alpha").unwrap();
        let zeta = prompt.find("## zeta").unwrap();
        assert!(alpha < zeta);
    }

    #[test]
    fn correction_hint_appears_only_on_retry() {
        let outputs = BTreeMap::new();
        let first = build_prompt(TaskKind::Copywriting, "draft copy", "", &outputs, "", None);
        assert!(!first.contains("Correction:"));

        let retry = build_prompt(
            TaskKind::Copywriting,
            "draft copy",
            "",
            &outputs,
            "",
            Some("variants must not be empty"),
        );
        assert!(retry.contains("Correction: variants must not be empty"));
        assert_ne!(first, retry);
    }

    #[test]
    fn history_and_context_are_included_when_present() {
        let outputs = BTreeMap::new();
        let prompt = build_prompt(
            TaskKind::Conversational,
            "and now?",
            "Conversation so far:\nuser: hi\n",
            &outputs,
            "Reference cases from past high performers:\n",
            None,
        );
        assert!(prompt.contains("Conversation so far:"));
        assert!(prompt.contains("Reference cases"));
    }

    #[test]
    fn every_task_has_instructions_and_schema() {
        for task in [
            TaskKind::Optimization,
            TaskKind::Copywriting,
            TaskKind::Conversational,
        ] {
            assert!(system_prompt(task).contains("JSON"));
            assert!(schema_block(task).contains("Respond with JSON"));
        }
    }
}
