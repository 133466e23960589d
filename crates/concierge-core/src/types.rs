// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the Concierge workspace.
//!
//! Everything here is a data contract shared by at least two crates:
//! intent labels, scan verdicts, routed replies, and the payloads
//! exchanged with collaborator handlers.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Closed set of intent labels a query can be routed under.
///
/// The first seven labels are the classifier's output alphabet; the last
/// three are assigned by the router itself (security gating and error
/// absorption) and are never produced by classification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum Intent {
    #[strum(serialize = "EVENT_QUERY_DB")]
    #[serde(rename = "EVENT_QUERY_DB")]
    EventQueryDb,
    #[strum(serialize = "RECOMMENDATION")]
    #[serde(rename = "RECOMMENDATION")]
    Recommendation,
    #[strum(serialize = "TIME_QUERY")]
    #[serde(rename = "TIME_QUERY")]
    TimeQuery,
    #[strum(serialize = "WEATHER_QUERY")]
    #[serde(rename = "WEATHER_QUERY")]
    WeatherQuery,
    #[strum(serialize = "IMAGE_GENERATION")]
    #[serde(rename = "IMAGE_GENERATION")]
    ImageGeneration,
    #[strum(serialize = "RAG_QUERY")]
    #[serde(rename = "RAG_QUERY")]
    RagQuery,
    #[strum(serialize = "UNKNOWN")]
    #[serde(rename = "UNKNOWN")]
    Unknown,
    #[strum(serialize = "SECURITY_BLOCKED")]
    #[serde(rename = "SECURITY_BLOCKED")]
    SecurityBlocked,
    #[strum(serialize = "SECURITY_FILTERED")]
    #[serde(rename = "SECURITY_FILTERED")]
    SecurityFiltered,
    #[strum(serialize = "ERROR")]
    #[serde(rename = "ERROR")]
    Error,
}

impl Intent {
    /// Labels the classifier may emit, in match-priority order.
    ///
    /// Classification scans the model output for the first of these that
    /// appears as a substring. The order is a fixed routing policy: it
    /// decides the winner when a verbose model response mentions more
    /// than one label. Substring matching (rather than exact matching)
    /// is likewise deliberate -- it tolerates chatty output such as
    /// "EVENT_QUERY_DB please".
    pub const CLASSIFIABLE: [Intent; 7] = [
        Intent::EventQueryDb,
        Intent::Recommendation,
        Intent::TimeQuery,
        Intent::WeatherQuery,
        Intent::ImageGeneration,
        Intent::RagQuery,
        Intent::Unknown,
    ];

    /// The canonical upper-snake label string.
    pub fn as_label(&self) -> &'static str {
        match self {
            Intent::EventQueryDb => "EVENT_QUERY_DB",
            Intent::Recommendation => "RECOMMENDATION",
            Intent::TimeQuery => "TIME_QUERY",
            Intent::WeatherQuery => "WEATHER_QUERY",
            Intent::ImageGeneration => "IMAGE_GENERATION",
            Intent::RagQuery => "RAG_QUERY",
            Intent::Unknown => "UNKNOWN",
            Intent::SecurityBlocked => "SECURITY_BLOCKED",
            Intent::SecurityFiltered => "SECURITY_FILTERED",
            Intent::Error => "ERROR",
        }
    }
}

/// What the scanner did with one scan call.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
pub enum ScanAction {
    /// No threat, traffic allowed.
    #[strum(serialize = "ALLOW")]
    #[serde(rename = "ALLOW")]
    Allow,
    /// Threat detected and the blocking policy is on.
    #[strum(serialize = "BLOCKED")]
    #[serde(rename = "BLOCKED")]
    Blocked,
    /// Threat detected but the policy is log-only.
    #[strum(serialize = "LOGGED")]
    #[serde(rename = "LOGGED")]
    Logged,
    /// Scanner disabled (no credential configured); no network call made.
    #[strum(serialize = "SKIP_DISABLED")]
    #[serde(rename = "SKIP_DISABLED")]
    SkipDisabled,
    /// Neither side of the interaction was eligible for scanning.
    #[strum(serialize = "SKIP_CONFIG")]
    #[serde(rename = "SKIP_CONFIG")]
    SkipConfig,
    /// Transport or HTTP failure; scan failed open.
    #[strum(serialize = "ERROR")]
    #[serde(rename = "ERROR")]
    Error,
    /// Scan request timed out; scan failed open.
    #[strum(serialize = "TIMEOUT")]
    #[serde(rename = "TIMEOUT")]
    Timeout,
    /// Remote payload could not be interpreted; scan failed open.
    #[strum(serialize = "PARSE_ERROR")]
    #[serde(rename = "PARSE_ERROR")]
    ParseError,
}

/// The verdict of one scan call. Constructed once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub is_safe: bool,
    pub threat_detected: bool,
    pub threat_type: Option<String>,
    pub risk_score: Option<f64>,
    pub action_taken: ScanAction,
    pub scan_time_ms: Option<f64>,
    /// Opaque remote payload (or error description) for operator display.
    pub details: Option<serde_json::Value>,
}

impl ScanOutcome {
    /// A clean skip verdict (`SKIP_DISABLED` or `SKIP_CONFIG`).
    pub fn skipped(action: ScanAction) -> Self {
        ScanOutcome {
            is_safe: true,
            threat_detected: false,
            threat_type: None,
            risk_score: None,
            action_taken: action,
            scan_time_ms: None,
            details: None,
        }
    }

    /// A fail-open verdict for a scan that could not be completed.
    pub fn fail_open(action: ScanAction, details: serde_json::Value) -> Self {
        ScanOutcome {
            is_safe: true,
            threat_detected: false,
            threat_type: None,
            risk_score: None,
            action_taken: action,
            scan_time_ms: None,
            details: Some(details),
        }
    }
}

/// Security metadata attached to a routed reply when scanning ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityReport {
    /// Verdict for the incoming prompt.
    pub prompt: ScanOutcome,
    /// Verdict for the produced response. Absent when the pre-scan
    /// short-circuited and no response was ever generated.
    pub response: Option<ScanOutcome>,
    /// Combined round-trip latency of the scans that executed. Absent
    /// (not zero) when any executed scan did not report a latency.
    pub scan_time_ms: Option<f64>,
}

/// The packaged result of one routed query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutedReply {
    pub response: String,
    pub intent: Intent,
    /// Present only when scanning was enabled for the turn.
    pub security: Option<SecurityReport>,
}

/// One completed exchange in the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub query: String,
    pub response: String,
    /// RFC 3339 timestamp of when the exchange completed.
    pub timestamp: String,
}

// --- Collaborator payloads ---

/// Forecast data returned by a weather handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub condition: String,
    pub temperature_c: f64,
    pub humidity: f64,
    pub wind_speed_kph: f64,
    pub rain_chance: f64,
    pub uv_index: f64,
}

/// One event row returned by the event store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub name: String,
    pub kind: String,
    pub location: String,
    pub price: f64,
    pub capacity: u32,
    pub indoor: bool,
    pub description: String,
    pub time: String,
}

/// Filters an event query may carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// `Some(true)` restricts to indoor events, `Some(false)` to outdoor.
    pub indoor: Option<bool>,
}
