// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversational memory for the Concierge assistant.
//!
//! Two pieces of per-conversation state: the entity context (last active
//! location and date, with stateful fallback extraction) and the bounded
//! history log of completed exchanges.

pub mod context;
pub mod history;

pub use context::{ConversationContext, reference_offset};
pub use history::HistoryLog;

/// Snapshot of the current conversational state, for operator display.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSummary {
    pub last_active_location: String,
    pub last_active_date: Option<String>,
    pub conversation_count: usize,
}

/// Entity context plus history, owned together per conversation.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    pub context: ConversationContext,
    pub history: HistoryLog,
    default_location: String,
}

impl ConversationMemory {
    pub fn new(default_location: impl Into<String>, max_history: usize) -> Self {
        let default_location = default_location.into();
        Self {
            context: ConversationContext::new(default_location.clone()),
            history: HistoryLog::new(max_history),
            default_location,
        }
    }

    /// Current location/date/turn-count snapshot.
    pub fn summary(&self) -> ContextSummary {
        ContextSummary {
            last_active_location: self.context.last_location().to_string(),
            last_active_date: self.context.last_date().map(str::to_string),
            conversation_count: self.history.len(),
        }
    }

    /// Clear history and restore the context to its seed values.
    pub fn reset(&mut self) {
        self.history.clear();
        self.context.reset(self.default_location.clone());
    }
}
