// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fallback handling for queries no specialized handler covers.
//!
//! Two guard rails: time-sensitive news/sports questions get a fixed
//! disclaimer instead of a guess, and everything else gets a brief
//! capability-scoped LLM answer. Every reply ends with the capability
//! reminder so the user learns what the assistant can actually do.

use tracing::{debug, warn};

use concierge_core::{CompletionProvider, CompletionRequest};

const SYSTEM_PROMPT: &str = "You are a friendly assistant for a multi-agent demo app. \
                             Answer the user briefly and politely in 1-2 sentences. \
                             Do not claim capabilities outside the listed services.";

const CAPABILITY_REMINDER: &str = "I'm focused on a few specific services right now. Try one of these:\n\
     - Recommendations: \"What should I do today?\"\n\
     - Events: \"Show me events today\"\n\
     - Future info: \"What concerts in 2026?\"\n\
     - Images: \"Generate an image of...\"\n\
     - Weather: \"What's the weather?\"\n\
     - Time: \"What time is it?\"";

const TIME_SENSITIVE_NOTICE: &str = "I don't have reliable access to live sports or news results. \
     I can still share general info if you rephrase, or you can ask about the features below.";

const REROUTED_NOTE: &str = "Note: I couldn't answer from the system's data, so I routed this to the LLM.";

/// Words suggesting the question is about a recent or current outcome.
const SIGNAL_WORDS: [&str; 11] = [
    "last week",
    "today",
    "yesterday",
    "this week",
    "recent",
    "latest",
    "who won",
    "results",
    "score",
    "champion",
    "final",
];

/// Topics for which outcomes go stale: news and sports.
const TOPIC_WORDS: [&str; 6] = ["news", "sports", "tournament", "open", "league", "cup"];

/// Handles `UNKNOWN` intents and retrieval reroutes.
#[derive(Debug, Clone)]
pub struct FallbackHandler {
    max_tokens: u32,
}

impl FallbackHandler {
    pub fn new(max_tokens: u32) -> Self {
        Self { max_tokens }
    }

    /// Produce a fallback answer for the query.
    ///
    /// `rerouted` marks queries that arrived here because a retrieval
    /// lookup found nothing useful; those replies carry a note saying
    /// so. Never fails: a provider error degrades to the capability
    /// reminder alone.
    pub async fn handle(
        &self,
        provider: &dyn CompletionProvider,
        query: &str,
        rerouted: bool,
    ) -> String {
        if looks_time_sensitive(query) {
            debug!("time-sensitive query, answering with disclaimer");
            return format!("{TIME_SENSITIVE_NOTICE}\n\n{CAPABILITY_REMINDER}");
        }

        let request = CompletionRequest {
            system: SYSTEM_PROMPT.to_string(),
            user: query.to_string(),
            temperature: 0.4,
            max_tokens: Some(self.max_tokens),
        };

        match provider.complete(request).await {
            Ok(reply) => {
                let reply = reply.trim();
                if rerouted {
                    format!("{reply}\n\n{REROUTED_NOTE}\n\n{CAPABILITY_REMINDER}")
                } else {
                    format!("{reply}\n\n{CAPABILITY_REMINDER}")
                }
            }
            Err(e) => {
                warn!(error = %e, "fallback completion failed, returning reminder only");
                CAPABILITY_REMINDER.to_string()
            }
        }
    }
}

/// A query looks time-sensitive when a signal word AND a topic word
/// both occur. Either alone is not enough: "today" appears in harmless
/// scheduling questions, and "news" alone may be historical.
pub fn looks_time_sensitive(query: &str) -> bool {
    let lowered = query.to_lowercase();
    SIGNAL_WORDS.iter().any(|s| lowered.contains(s))
        && TOPIC_WORDS.iter().any(|t| lowered.contains(t))
}
