// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the AIRS synchronous scan API.
//!
//! The request side is built exactly as the service expects it; the
//! response side is deliberately loose (every field optional) because
//! deployments report verdicts either at the top level or inside a
//! `details` object, and sometimes both.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use concierge_core::ScanAction;

/// Scan request payload for `POST /v1/scan/sync/request`.
#[derive(Debug, Clone, Serialize)]
pub struct ScanRequest {
    pub metadata: ScanMetadata,
    pub contents: Vec<ScanContent>,
    pub tr_id: String,
    pub ai_profile: AiProfile,
}

/// Request metadata block identifying the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ScanMetadata {
    pub ai_model: String,
    pub app_name: String,
    pub app_user: String,
    pub agent_name: String,
    /// UTC timestamp, ISO 8601.
    pub timestamp: String,
}

/// One prompt/response pair submitted for scanning. A side that is not
/// being scanned is sent as the empty string.
#[derive(Debug, Clone, Serialize)]
pub struct ScanContent {
    pub prompt: String,
    pub response: String,
}

/// Deployment profile reference.
#[derive(Debug, Clone, Serialize)]
pub struct AiProfile {
    pub profile_name: String,
}

/// Scan response payload. Deployments differ in which of these fields
/// they populate, so everything is optional and the verdict ORs all
/// the signals together.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanPayload {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub threats: Vec<ThreatEntry>,
    #[serde(default)]
    pub risk_score: Option<f64>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub details: Option<ScanDetails>,
}

/// One entry of the top-level threat list.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreatEntry {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// The nested `details` verdict block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanDetails {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub prompt_detected: Option<serde_json::Map<String, Value>>,
    #[serde(default)]
    pub response_detected: Option<serde_json::Map<String, Value>>,
}

/// The interpreted result of a scan payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub threat_detected: bool,
    pub is_safe: bool,
    pub threat_type: Option<String>,
    pub risk_score: Option<f64>,
    pub action_taken: ScanAction,
}

impl ScanPayload {
    /// Derive the verdict from the payload's signals.
    ///
    /// A threat is reported when ANY of the signals fires: a non-empty
    /// threat list, `status == "threat"`, any truthy flag in the nested
    /// detection maps, a category other than "benign", or an action of
    /// "block" (string comparisons case-insensitive). `is_safe` stays
    /// true when the effective action is "allow" even if a threat was
    /// flagged, so a log-only profile never blocks traffic.
    pub fn verdict(&self, block_on_threat: bool) -> Verdict {
        let details = self.details.clone().unwrap_or_default();
        let prompt_detected = details.prompt_detected.unwrap_or_default();
        let response_detected = details.response_detected.unwrap_or_default();

        let detected_any = prompt_detected
            .values()
            .chain(response_detected.values())
            .any(truthy);

        // A details-level action overrides the top-level one.
        let action = details
            .action
            .as_deref()
            .or(self.action.as_deref())
            .unwrap_or("allow");

        let category = details.category.as_deref();

        let threat_detected = !self.threats.is_empty()
            || self.status.as_deref() == Some("threat")
            || detected_any
            || category.is_some_and(|c| !c.eq_ignore_ascii_case("benign"))
            || action.eq_ignore_ascii_case("block");

        let is_safe = !threat_detected || action.eq_ignore_ascii_case("allow");

        let threat_type = if let Some(first) = self.threats.first() {
            first.kind.clone()
        } else if let Some(category) = category {
            Some(category.to_string())
        } else {
            prompt_detected
                .iter()
                .chain(response_detected.iter())
                .find(|(_, v)| truthy(v))
                .map(|(k, _)| k.clone())
        };

        let action_taken = if threat_detected && block_on_threat {
            ScanAction::Blocked
        } else if threat_detected {
            ScanAction::Logged
        } else {
            ScanAction::Allow
        };

        Verdict {
            threat_detected,
            is_safe,
            threat_type,
            risk_score: self.risk_score,
            action_taken,
        }
    }
}

/// Truthiness of a detection-map value: false, null, zero, and the
/// empty string/array/object all read as "not detected".
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
