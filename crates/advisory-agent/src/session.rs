// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caller-owned multi-turn conversation state.
//!
//! The state is passed into `run` and mutated in place; it is never
//! stored in ambient global state, so concurrent sessions cannot observe
//! each other. History is a capped FIFO: oldest turns drop first.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use strum::Display;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One utterance in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Multi-turn context for one agent session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationState {
    turns: VecDeque<Turn>,
    /// Tool outputs from the most recent run, for dashboard display.
    pub last_tool_results: Option<serde_json::Value>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn, dropping the oldest turns beyond `max_turns`.
    pub fn push_turn(&mut self, role: Role, content: impl Into<String>, max_turns: usize) {
        self.turns.push_back(Turn {
            role,
            content: content.into(),
        });
        while self.turns.len() > max_turns.max(1) {
            self.turns.pop_front();
        }
    }

    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Render prior turns as a prompt block. Empty string for a fresh
    /// session.
    pub fn history_block(&self) -> String {
        if self.turns.is_empty() {
            return String::new();
        }
        let mut block = String::from("Conversation so far:\n");
        for turn in &self.turns {
            block.push_str(&format!("{}: {}\n", turn.role, turn.content));
        }
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_turns_drop_first_at_the_cap() {
        let mut state = ConversationState::new();
        for i in 0..6 {
            state.push_turn(Role::User, format!("message {i}"), 4);
        }
        assert_eq!(state.len(), 4);
        assert_eq!(state.turns().next().unwrap().content, "message 2");
        assert_eq!(state.turns().last().unwrap().content, "message 5");
    }

    #[test]
    fn history_block_is_empty_for_a_fresh_session() {
        assert_eq!(ConversationState::new().history_block(), "");
    }

    #[test]
    fn history_block_renders_roles_in_order() {
        let mut state = ConversationState::new();
        state.push_turn(Role::User, "hi", 10);
        state.push_turn(Role::Assistant, "hello", 10);
        let block = state.history_block();
        assert!(block.contains("user: hi\nassistant: hello"));
    }
}
