// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The query orchestrator.
//!
//! One query at a time moves through an explicit turn state machine:
//!
//! ```text
//! RECEIVED -> PRE_SCANNED -> CLASSIFIED -> DISPATCHED
//!          -> POST_SCANNED -> RECORDED -> RETURNED
//! ```
//!
//! with an ERROR absorbing state reachable from any step. The router
//! never panics and never returns an error: security blocks, handler
//! failures, classification failures, and orchestrator-level failures
//! all degrade to a textual response with an intent label.

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;
use strum::Display;
use tracing::{debug, error, info, warn};

use concierge_airs::{AirsScanner, ScanInput};
use concierge_core::{
    CompletionProvider, CompletionRequest, ConciergeError, EventFilter, EventRecord, EventStore,
    ImageGenerator, Intent, Recommender, Retriever, RoutedReply, ScanAction, ScanOutcome,
    SecurityReport, WeatherHandler, WeatherReport,
};
use concierge_memory::ConversationMemory;

use crate::classifier::IntentClassifier;
use crate::fallback::FallbackHandler;
use crate::time;

/// Strips the imperative prefix from an image request, leaving the
/// subject to draw.
static IMAGE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(generate|create|make|draw)\s+(an?\s+)?(image|picture|photo)\s+(of\s+)?")
        .unwrap()
});

/// Phrases marking a retrieval answer as a non-answer.
const NO_ANSWER_PHRASES: [&str; 6] = [
    "documents provided do not contain",
    "i don't know",
    "i do not know",
    "not contain information",
    "cannot find",
    "no information",
];

const EVENT_ANSWER_SYSTEM: &str = "You are a helpful assistant.";

/// Where a turn currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TurnState {
    #[strum(serialize = "RECEIVED")]
    Received,
    #[strum(serialize = "PRE_SCANNED")]
    PreScanned,
    #[strum(serialize = "CLASSIFIED")]
    Classified,
    #[strum(serialize = "DISPATCHED")]
    Dispatched,
    #[strum(serialize = "POST_SCANNED")]
    PostScanned,
    #[strum(serialize = "RECORDED")]
    Recorded,
    #[strum(serialize = "RETURNED")]
    Returned,
    #[strum(serialize = "ERROR")]
    Error,
}

/// The external collaborators a router dispatches to.
pub struct Collaborators {
    pub provider: Arc<dyn CompletionProvider>,
    pub weather: Arc<dyn WeatherHandler>,
    pub events: Arc<dyn EventStore>,
    pub recommender: Arc<dyn Recommender>,
    pub retriever: Arc<dyn Retriever>,
    pub images: Arc<dyn ImageGenerator>,
}

/// Tunables the router reads from configuration.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Model identifier reported in scan metadata.
    pub model: String,
    pub default_location: String,
    pub max_history: usize,
    pub classifier_max_tokens: u32,
    pub fallback_max_tokens: u32,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            default_location: "Singapore".to_string(),
            max_history: 20,
            classifier_max_tokens: 20,
            fallback_max_tokens: 80,
        }
    }
}

/// Routes queries to specialized handlers with two-sided security
/// scanning around the dispatch.
pub struct QueryRouter {
    collaborators: Collaborators,
    scanner: Option<Arc<AirsScanner>>,
    classifier: IntentClassifier,
    fallback: FallbackHandler,
    memory: ConversationMemory,
    model: String,
}

impl QueryRouter {
    pub fn new(collaborators: Collaborators, options: RouterOptions) -> Self {
        Self {
            collaborators,
            scanner: None,
            classifier: IntentClassifier::new(options.classifier_max_tokens),
            fallback: FallbackHandler::new(options.fallback_max_tokens),
            memory: ConversationMemory::new(options.default_location, options.max_history),
            model: options.model,
        }
    }

    /// Attach a threat scanner. Scanning only runs when the scanner
    /// has a credential configured.
    pub fn with_scanner(mut self, scanner: Arc<AirsScanner>) -> Self {
        if scanner.is_enabled() {
            info!("runtime security scanning enabled");
        } else {
            info!("running without security monitoring");
        }
        self.scanner = Some(scanner);
        self
    }

    /// The conversation memory (context and history).
    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// Clear the conversation memory.
    pub fn reset_memory(&mut self) {
        self.memory.reset();
    }

    fn scanning_enabled(&self) -> bool {
        self.scanner.as_ref().is_some_and(|s| s.is_enabled())
    }

    /// Handle one query start to finish.
    ///
    /// Never returns an error: every failure path yields a textual
    /// response and an intent label.
    pub async fn handle_query(&mut self, query: &str, user_id: &str) -> RoutedReply {
        let mut state = TurnState::Received;
        debug!(user_id, "query received");

        // Pre-scan the raw prompt before anything else touches it.
        let pre_scan = if self.scanning_enabled() {
            let scanner = self.scanner.as_ref().expect("scanner present when enabled");
            let outcome = scanner
                .scan(
                    ScanInput::prompt(query)
                        .with_model(&self.model)
                        .with_user(user_id)
                        .with_agent("controller_input"),
                )
                .await;

            if outcome.threat_detected && scanner.blocks_on_threat() {
                warn!(
                    threat_type = outcome.threat_type.as_deref(),
                    "threat blocked at pre-scan"
                );
                advance(&mut state, TurnState::Returned);
                let response = scanner.safe_response(outcome.threat_type.as_deref());
                return RoutedReply {
                    response,
                    intent: Intent::SecurityBlocked,
                    security: Some(SecurityReport {
                        prompt: outcome,
                        response: None,
                        scan_time_ms: None,
                    }),
                };
            }
            if outcome.threat_detected {
                warn!(
                    threat_type = outcome.threat_type.as_deref(),
                    "threat logged at pre-scan, not blocking"
                );
            }
            Some(outcome)
        } else {
            None
        };
        advance(&mut state, TurnState::PreScanned);

        match self.run_turn(query, user_id, pre_scan, &mut state).await {
            Ok(reply) => {
                advance(&mut state, TurnState::Returned);
                reply
            }
            Err(e) => {
                error!(error = %e, "turn failed");
                advance(&mut state, TurnState::Error);
                RoutedReply {
                    response: format!("Error processing request: {e}"),
                    intent: Intent::Error,
                    security: None,
                }
            }
        }
    }

    /// Steps 2-6 of the turn: classify, dispatch, post-scan, record,
    /// package. Any error escaping here becomes the generic ERROR
    /// payload in `handle_query`.
    async fn run_turn(
        &mut self,
        query: &str,
        user_id: &str,
        pre_scan: Option<ScanOutcome>,
        state: &mut TurnState,
    ) -> Result<RoutedReply, ConciergeError> {
        let (location, date) = self.memory.context.extract(query);
        let intent = self
            .classifier
            .classify(self.collaborators.provider.as_ref(), query, &date)
            .await;
        info!(intent = %intent, location = %location, date = %date, "query classified");
        advance(state, TurnState::Classified);

        let (mut intent, mut response) = self
            .dispatch(intent, query, &location, &date, user_id)
            .await;
        advance(state, TurnState::Dispatched);

        let post_scan = if self.scanning_enabled() {
            let scanner = self.scanner.as_ref().expect("scanner present when enabled");
            let agent_name = format!("controller_{}", intent.as_label().to_lowercase());
            let outcome = scanner
                .scan(
                    ScanInput::prompt(query)
                        .with_response(&response)
                        .with_model(&self.model)
                        .with_user(user_id)
                        .with_agent(&agent_name),
                )
                .await;

            if outcome.threat_detected && scanner.blocks_on_threat() {
                warn!(
                    threat_type = outcome.threat_type.as_deref(),
                    "response blocked at post-scan"
                );
                response = format!(
                    "{}\n\n_Note: The original response was filtered for security reasons._",
                    scanner.safe_response(outcome.threat_type.as_deref())
                );
                intent = Intent::SecurityFiltered;
            }
            Some(outcome)
        } else {
            None
        };
        advance(state, TurnState::PostScanned);

        self.memory.history.push(query, response.clone());
        advance(state, TurnState::Recorded);

        let security = pre_scan.map(|prompt| {
            let scan_time_ms = combined_scan_time(&prompt, post_scan.as_ref());
            SecurityReport {
                prompt,
                response: post_scan,
                scan_time_ms,
            }
        });

        Ok(RoutedReply {
            response,
            intent,
            security,
        })
    }

    /// Route by intent label. Handler errors are caught here and
    /// converted to error text; the intent stays what the classifier
    /// said, except when a retrieval non-answer reroutes to fallback.
    async fn dispatch(
        &self,
        intent: Intent,
        query: &str,
        location: &str,
        date: &str,
        user_id: &str,
    ) -> (Intent, String) {
        match intent {
            Intent::ImageGeneration => (intent, self.handle_image(query, user_id).await),
            Intent::RagQuery => self.handle_rag(query).await,
            Intent::EventQueryDb => (intent, self.handle_events(query, date).await),
            Intent::Recommendation => (intent, self.handle_recommendation(location, date).await),
            Intent::WeatherQuery => (intent, self.handle_weather(location, date).await),
            Intent::TimeQuery => (intent, time::handle_time_query(query)),
            _ => (
                Intent::Unknown,
                self.fallback
                    .handle(self.collaborators.provider.as_ref(), query, false)
                    .await,
            ),
        }
    }

    async fn handle_weather(&self, location: &str, date: &str) -> String {
        debug!(location, date, "fetching weather");
        let weather = match self.collaborators.weather.weather(location, date).await {
            Ok(weather) => weather,
            Err(e) => return format!("Error fetching weather for {location}: {e}"),
        };

        let mut response = format!(
            "The weather in {location} on {date} is: {} with a temperature of {}°C. \
             The humidity is {}% and wind speed is {} km/h.",
            weather.condition, weather.temperature_c, weather.humidity, weather.wind_speed_kph
        );
        if let Some(advisory) = weather_advisory(&weather) {
            response.push_str("\n\n");
            response.push_str(&advisory);
        }
        response
    }

    async fn handle_events(&self, query: &str, date: &str) -> String {
        let lowered = query.to_lowercase();
        let filter = if lowered.contains("indoor") {
            EventFilter { indoor: Some(true) }
        } else if lowered.contains("outdoor") {
            EventFilter {
                indoor: Some(false),
            }
        } else {
            EventFilter::default()
        };

        debug!(date, ?filter, "querying events");
        let events = match self.collaborators.events.events_on(date, filter).await {
            Ok(events) => events,
            Err(e) => return format!("Error processing event query: {e}"),
        };
        if events.is_empty() {
            return format!("I couldn't find any events scheduled for {date}.");
        }

        let event_list = format_event_list(&events);
        let request = CompletionRequest {
            system: EVENT_ANSWER_SYSTEM.to_string(),
            user: format!(
                "You are a helpful event assistant. Answer the user's question based ONLY \
                 on the following event information.\n\
                 \n\
                 User Question: \"{query}\"\n\
                 \n\
                 Available Events for {date}:\n\
                 {event_list}\n\
                 \n\
                 Instructions:\n\
                 1. If the user asks for a list, format it as a bulleted list. Use bold for \
                 event names (e.g., **Event Name** - Details).\n\
                 2. If the user asks specific questions (e.g., \"how much for 2 people\", \
                 \"is there anything cheap\"), calculate the answer or filter based on the \
                 data provided.\n\
                 3. Do not make up information not present in the event list.\n\
                 4. Be concise but engaging."
            ),
            temperature: 0.7,
            max_tokens: None,
        };

        match self.collaborators.provider.complete(request).await {
            Ok(answer) => answer,
            Err(e) => format!("Error processing event query: {e}"),
        }
    }

    async fn handle_recommendation(&self, location: &str, date: &str) -> String {
        debug!(location, date, "generating recommendation");
        let result: Result<String, ConciergeError> = async {
            let weather = self.collaborators.weather.weather(location, date).await?;
            let events = self
                .collaborators
                .events
                .events_on(date, EventFilter::default())
                .await?;
            if events.is_empty() {
                return Ok(format!(
                    "No events in database for {date}. Try asking about 2026 events!"
                ));
            }
            self.collaborators
                .recommender
                .recommend(&weather, &events)
                .await
        }
        .await;

        match result {
            Ok(text) => text,
            Err(e) => format!("Error: {e}"),
        }
    }

    async fn handle_rag(&self, query: &str) -> (Intent, String) {
        debug!("searching knowledge base");
        match self.collaborators.retriever.lookup(query).await {
            Ok(answer) if !is_no_answer(&answer) => {
                let mut answer = answer;
                if query.contains("2026") {
                    answer.push_str("\n\n_For current events, ask for recommendations!_");
                }
                (Intent::RagQuery, answer)
            }
            Ok(_) | Err(_) => {
                debug!("retrieval found nothing useful, rerouting to fallback");
                (
                    Intent::Unknown,
                    self.fallback
                        .handle(self.collaborators.provider.as_ref(), query, true)
                        .await,
                )
            }
        }
    }

    async fn handle_image(&self, query: &str, user_id: &str) -> String {
        let prompt = IMAGE_PREFIX_RE.replace(query, "").trim().to_string();
        if prompt.chars().count() < 3 {
            return "Please provide a description for the image.".to_string();
        }

        // Extra pre-generation scan: image generation is high-risk, so
        // a detected threat refuses regardless of the blocking policy.
        if self.scanning_enabled() {
            let scanner = self.scanner.as_ref().expect("scanner present when enabled");
            let framed = format!("Image generation request: {prompt}");
            let outcome = scanner
                .scan(
                    ScanInput::prompt(&framed)
                        .with_model("dall-e-3")
                        .with_user(user_id)
                        .with_agent("image_agent"),
                )
                .await;
            if outcome.threat_detected {
                warn!(
                    threat_type = outcome.threat_type.as_deref(),
                    "image generation refused"
                );
                return scanner.safe_response(outcome.threat_type.as_deref());
            }
        }

        match self.collaborators.images.generate(&prompt).await {
            Ok(url) => format!(
                "Here is your image based on '{prompt}':\n\n\
                 ![Generated Image]({url})\n\n\
                 [Open Image in Browser]({url})"
            ),
            Err(e) => format!("Error: {e}"),
        }
    }
}

fn advance(state: &mut TurnState, next: TurnState) {
    debug!(from = %state, to = %next, "turn state");
    *state = next;
}

/// At most one advisory, in severity order.
fn weather_advisory(weather: &WeatherReport) -> Option<String> {
    if weather.rain_chance > 60.0 {
        Some(format!(
            "High chance of rain ({}%). Consider indoor activities!",
            weather.rain_chance
        ))
    } else if weather.uv_index >= 8.0 {
        Some(format!(
            "High UV index ({}). Remember sunscreen!",
            weather.uv_index
        ))
    } else if weather.temperature_c > 32.0 {
        Some("High temperature. Stay hydrated!".to_string())
    } else {
        None
    }
}

fn format_event_list(events: &[EventRecord]) -> String {
    events
        .iter()
        .map(|e| {
            format!(
                "- {} ({}): Located at {}. Price: ${}. Capacity: {}. Indoor: {}.",
                e.name, e.kind, e.location, e.price, e.capacity, e.indoor
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A retrieval answer counts as a non-answer when empty or when it
/// contains one of the known "no information" phrases.
fn is_no_answer(answer: &str) -> bool {
    if answer.trim().is_empty() {
        return true;
    }
    let lowered = answer.to_lowercase();
    NO_ANSWER_PHRASES.iter().any(|p| lowered.contains(p))
}

/// Combined latency of the scans that actually executed. `None` when
/// any executed scan failed to report one, or when nothing executed.
fn combined_scan_time(prompt: &ScanOutcome, response: Option<&ScanOutcome>) -> Option<f64> {
    let executed: Vec<&ScanOutcome> = [Some(prompt), response]
        .into_iter()
        .flatten()
        .filter(|o| !matches!(o.action_taken, ScanAction::SkipDisabled | ScanAction::SkipConfig))
        .collect();

    if executed.is_empty() {
        return None;
    }
    executed
        .iter()
        .map(|o| o.scan_time_ms)
        .try_fold(0.0, |acc, t| t.map(|t| acc + t))
}
