// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The agent request state machine.
//!
//! Each request walks `INTENT_CLASSIFY → TOOL_SELECT → TOOL_EXEC →
//! CONTEXT_BUILD → LLM_CALL → VALIDATE`, looping back to `CONTEXT_BUILD`
//! with a correction hint while validation fails and attempts remain.
//! Transitions are strictly sequential per request; only tool execution
//! fans out. The whole run sits under a wall-clock budget.

use std::sync::Arc;

use strum::Display;
use tracing::{debug, info, warn};

use advisory_config::model::AgentConfig;
use advisory_core::error::AdvisoryError;
use advisory_core::types::{GenerationRequest, PerformanceRecord};
use advisory_gateway::CacheGateway;
use advisory_knowledge::retriever::Retriever;

use crate::intent::Intent;
use crate::prompt::{build_prompt, system_prompt};
use crate::result::{AgentResult, TaskKind};
use crate::session::{ConversationState, Role};
use crate::tools::{ToolContext, execute_tools, select_tools};
use crate::validate::validate;

/// States of one agent request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
enum AgentState {
    IntentClassify,
    ToolSelect,
    ToolExec,
    ContextBuild,
    LlmCall,
    Validate,
    Done,
    Fail,
}

/// Runs agent tasks over the cache gateway and the knowledge base.
pub struct AgentRuntime {
    gateway: Arc<CacheGateway>,
    retriever: Option<Arc<Retriever>>,
    /// Knowledge collection consulted for retrieval context.
    collection: String,
    config: AgentConfig,
}

impl AgentRuntime {
    pub fn new(
        gateway: Arc<CacheGateway>,
        retriever: Option<Arc<Retriever>>,
        collection: impl Into<String>,
        config: AgentConfig,
    ) -> Self {
        Self {
            gateway,
            retriever,
            collection: collection.into(),
            config,
        }
    }

    /// Run one agent request under the configured wall-clock budget.
    ///
    /// `state` is the caller-owned conversation; the user message and the
    /// final reply are appended to it, oldest turns dropping first. On
    /// budget expiry in-flight work is cancelled and the request fails
    /// with a timeout rather than returning a partial result.
    pub async fn run(
        &self,
        task: TaskKind,
        session_id: &str,
        user_message: &str,
        records: Arc<Vec<PerformanceRecord>>,
        state: &mut ConversationState,
    ) -> Result<AgentResult, AdvisoryError> {
        let budget = self.config.request_budget();
        match tokio::time::timeout(
            budget,
            self.run_inner(task, session_id, user_message, records, state),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(session_id, budget_secs = budget.as_secs(), "request budget exhausted");
                Err(AdvisoryError::Timeout { duration: budget })
            }
        }
    }

    async fn run_inner(
        &self,
        task: TaskKind,
        session_id: &str,
        user_message: &str,
        records: Arc<Vec<PerformanceRecord>>,
        state: &mut ConversationState,
    ) -> Result<AgentResult, AdvisoryError> {
        self.transition(session_id, AgentState::IntentClassify);
        let intent = Intent::for_task(task, user_message);

        self.transition(session_id, AgentState::ToolSelect);
        let tool_names = select_tools(intent);
        debug!(session_id, intent = %intent, tools = ?tool_names, "tools selected");

        self.transition(session_id, AgentState::ToolExec);
        let ctx = Arc::new(ToolContext {
            records,
            retriever: self.retriever.clone(),
            collection: self.collection.clone(),
            query: user_message.to_string(),
            retrieval_k: self.config.retrieval_k,
            target_roas: self.config.target_roas,
        });
        let tool_outputs =
            execute_tools(&tool_names, ctx, self.config.tool_concurrency_limit).await?;
        state.last_tool_results = serde_json::to_value(&tool_outputs).ok();

        let retrieved_context = self.retrieval_context(task, user_message).await;

        // History is rendered before the current message is appended so
        // the prompt does not contain it twice.
        let history = state.history_block();

        let max_attempts = self.config.max_attempts.max(1);
        let mut failures = 0u32;
        let mut correction: Option<String> = None;

        for attempt in 1..=max_attempts {
            self.transition(session_id, AgentState::ContextBuild);
            let prompt = build_prompt(
                task,
                user_message,
                &history,
                &tool_outputs,
                &retrieved_context,
                correction.as_deref(),
            );

            self.transition(session_id, AgentState::LlmCall);
            let request = GenerationRequest {
                model: String::new(),
                system_prompt: Some(system_prompt(task).to_string()),
                prompt,
                max_tokens: 1024,
                temperature: 0.7,
            };
            let outcome = match self.gateway.invoke(request).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.transition(session_id, AgentState::Fail);
                    return Err(e);
                }
            };

            self.transition(session_id, AgentState::Validate);
            match validate(task, &outcome.text) {
                Ok(payload) => {
                    self.transition(session_id, AgentState::Done);
                    info!(session_id, task = %task, retry_count = failures, "agent run complete");
                    let suggestions = payload.suggestions();
                    let reply = payload.display_text();
                    self.record_turns(state, user_message, &reply);
                    return Ok(AgentResult {
                        task,
                        payload: Some(payload),
                        raw_text: outcome.text,
                        valid: true,
                        retry_count: failures,
                        intent,
                        suggestions,
                    });
                }
                Err(AdvisoryError::Validation(msg)) => {
                    failures += 1;
                    warn!(session_id, attempt, reason = msg.as_str(), "validation failed");
                    if attempt == max_attempts {
                        self.transition(session_id, AgentState::Fail);
                        self.record_turns(state, user_message, &outcome.text);
                        return Ok(AgentResult {
                            task,
                            payload: None,
                            raw_text: outcome.text,
                            valid: false,
                            retry_count: failures,
                            intent,
                            suggestions: vec![],
                        });
                    }
                    correction = Some(format!(
                        "Attempt {attempt} was rejected: {msg}. Reply with only the \
                         corrected JSON object."
                    ));
                }
                Err(e) => {
                    self.transition(session_id, AgentState::Fail);
                    return Err(e);
                }
            }
        }

        // The loop always returns on its final attempt.
        Err(AdvisoryError::Internal(
            "agent attempt loop ended without a result".to_string(),
        ))
    }

    /// Reference-case context for tasks that benefit from it. Knowledge
    /// base failures degrade to an empty block; the run proceeds without
    /// retrieval.
    async fn retrieval_context(&self, task: TaskKind, user_message: &str) -> String {
        if task != TaskKind::Copywriting {
            return String::new();
        }
        let Some(retriever) = &self.retriever else {
            return String::new();
        };
        match retriever
            .context_for_generation(&self.collection, user_message, self.config.retrieval_k)
            .await
        {
            Ok(context) => context,
            Err(e) => {
                warn!(error = %e, "proceeding without retrieval context");
                String::new()
            }
        }
    }

    fn record_turns(&self, state: &mut ConversationState, user_message: &str, reply: &str) {
        let cap = self.config.max_conversation_turns;
        state.push_turn(Role::User, user_message, cap);
        state.push_turn(Role::Assistant, reply, cap);
    }

    fn transition(&self, session_id: &str, to: AgentState) {
        debug!(session_id, state = %to, "agent transition");
    }
}
