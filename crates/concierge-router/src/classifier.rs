// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM-backed intent classification.
//!
//! One deterministic completion call per query. The model output is
//! upper-cased and scanned for the first known label appearing as a
//! substring, in the fixed priority order of `Intent::CLASSIFIABLE`.
//! Substring matching is the documented policy: it tolerates verbose
//! model output, and the priority order decides the winner when the
//! output mentions more than one label. Any failure downgrades
//! silently to `UNKNOWN`.

use tracing::{debug, warn};

use concierge_core::{CompletionProvider, CompletionRequest, Intent};

const SYSTEM_PROMPT: &str = "Classify intent. Reply with ONE word only.";

/// Classifies queries into intent labels via one completion call.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    max_tokens: u32,
}

impl IntentClassifier {
    pub fn new(max_tokens: u32) -> Self {
        Self { max_tokens }
    }

    /// Classify a query, given the date resolved from context.
    ///
    /// Never fails: a provider error or an unrecognized label both
    /// yield `Intent::Unknown`.
    pub async fn classify(
        &self,
        provider: &dyn CompletionProvider,
        query: &str,
        date: &str,
    ) -> Intent {
        let request =
            CompletionRequest::deterministic(SYSTEM_PROMPT, instruction(query, date), self.max_tokens);

        let raw = match provider.complete(request).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "intent classification failed");
                return Intent::Unknown;
            }
        };

        let intent = parse_label(&raw);
        debug!(raw = %raw.trim(), intent = %intent, "classified query");
        intent
    }
}

/// First classifiable label appearing as a substring of the upper-cased
/// output, in priority order.
fn parse_label(raw: &str) -> Intent {
    let upper = raw.to_uppercase();
    Intent::CLASSIFIABLE
        .into_iter()
        .find(|intent| upper.contains(intent.as_label()))
        .unwrap_or(Intent::Unknown)
}

fn instruction(query: &str, date: &str) -> String {
    format!(
        "Classify this query into ONE category:\n\
         \n\
         Query: \"{query}\"\n\
         Date: \"{date}\"\n\
         \n\
         Categories:\n\
         - EVENT_QUERY_DB: List/filter events, ask price/capacity (\"show events\", \"how much\")\n\
         - RECOMMENDATION: Ask for suggestions (\"what should I do\", \"recommend\")\n\
         - TIME_QUERY: Ask current time/date (\"what time\", \"what date\", \"what day\")\n\
         - WEATHER_QUERY: Ask weather (\"weather\", \"temperature\")\n\
         - IMAGE_GENERATION: Generate image (\"generate image\", \"create picture\")\n\
         - RAG_QUERY: Future events 2026+, history (\"2026 concerts\", \"F1 history\")\n\
         - UNKNOWN: None of above\n\
         \n\
         Rules (first match wins):\n\
         1. IF \"generate\" or \"create image\" -> IMAGE_GENERATION\n\
         2. IF \"what time\" or \"what date\" or \"what day\" or \"when is\" -> TIME_QUERY\n\
         3. IF \"weather\" or \"temperature\" -> WEATHER_QUERY\n\
         4. IF price/cost/capacity keywords -> EVENT_QUERY_DB\n\
         5. IF \"history\" or \"2026+\" -> RAG_QUERY\n\
         6. IF \"recommend\" or \"suggest\" -> RECOMMENDATION\n\
         7. IF \"show\" or \"list\" -> EVENT_QUERY_DB\n\
         \n\
         Category (one word):"
    )
}
