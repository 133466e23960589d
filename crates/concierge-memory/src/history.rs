// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded conversation history.
//!
//! An ordered log of completed exchanges. Insertion order is
//! conversation order; when the configured capacity is exceeded the
//! oldest entry is evicted first.

use std::collections::VecDeque;

use chrono::Utc;
use concierge_core::HistoryEntry;
use tracing::debug;

/// FIFO-bounded log of `(query, response, timestamp)` entries.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
    max_entries: usize,
}

impl HistoryLog {
    /// Create an empty log holding at most `max_entries` exchanges.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_entries.min(64)),
            max_entries,
        }
    }

    /// Append an exchange stamped with the current time, evicting the
    /// oldest entry if the log is at capacity.
    pub fn push(&mut self, query: impl Into<String>, response: impl Into<String>) {
        self.push_at(query, response, Utc::now().to_rfc3339());
    }

    /// Append an exchange with an explicit timestamp (test seam).
    pub fn push_at(
        &mut self,
        query: impl Into<String>,
        response: impl Into<String>,
        timestamp: String,
    ) {
        self.entries.push_back(HistoryEntry {
            query: query.into(),
            response: response.into(),
            timestamp,
        });

        while self.entries.len() > self.max_entries {
            let evicted = self.entries.pop_front();
            debug!(
                evicted_query = evicted.as_ref().map(|e| e.query.as_str()),
                "history at capacity, evicted oldest entry"
            );
        }
    }

    /// The entries in conversation order, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
