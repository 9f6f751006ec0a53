// SPDX-FileCopyrightText: 2026 Advisory Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded agent workflows: intent classification, tool selection,
//! prompt assembly, and schema validation over the cache gateway.

pub mod intent;
pub mod prompt;
pub mod result;
pub mod runtime;
pub mod session;
pub mod tools;
pub mod validate;

pub use intent::Intent;
pub use result::{
    AgentResult, ConversationalReply, CopywritingDraft, CopywritingResult, OptimizationAction,
    OptimizationReport, Priority, TaskKind, TaskPayload,
};
pub use runtime::AgentRuntime;
pub use session::{ConversationState, Role, Turn};
