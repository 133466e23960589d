// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the AIRS synchronous scan API.
//!
//! Provides [`AirsScanner`] which handles request construction,
//! credential headers, fail-open error handling, activation-status
//! tracking, and process-lifetime scan statistics.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use chrono::Utc;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use serde_json::json;
use strum::Display;
use tracing::{debug, error, info, warn};

use concierge_config::model::SecurityConfig;
use concierge_core::{ConciergeError, ScanAction, ScanOutcome};

use crate::types::{AiProfile, ScanContent, ScanMetadata, ScanPayload, ScanRequest};

/// Base URL for the AIRS scan service.
const API_BASE_URL: &str = "https://service.api.aisecurity.paloaltonetworks.com";

/// Path of the synchronous scan endpoint.
const SYNC_SCAN_PATH: &str = "/v1/scan/sync/request";

/// Connection state of the scanner, tracked across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ActivationStatus {
    /// No credential configured; scanning never runs.
    #[strum(serialize = "disabled")]
    Disabled,
    /// Credential configured, no scan attempted yet.
    #[strum(serialize = "pending")]
    Pending,
    /// Last scan succeeded.
    #[strum(serialize = "active")]
    Active,
    /// Remote answered 403; the account is not activated yet.
    #[strum(serialize = "pending_activation")]
    PendingActivation,
    /// Remote answered 401; the credential is wrong.
    #[strum(serialize = "auth_failed")]
    AuthFailed,
    /// Last scan timed out.
    #[strum(serialize = "timeout")]
    Timeout,
    /// Last scan failed for another reason.
    #[strum(serialize = "error")]
    Error,
}

/// One side of an interaction submitted for scanning.
#[derive(Debug, Clone, Copy)]
pub struct ScanInput<'a> {
    pub prompt: &'a str,
    pub response: Option<&'a str>,
    pub model: &'a str,
    pub user: &'a str,
    pub agent: &'a str,
}

impl<'a> ScanInput<'a> {
    /// A prompt-only scan with default attribution.
    pub fn prompt(prompt: &'a str) -> Self {
        Self {
            prompt,
            response: None,
            model: "gpt-4",
            user: "anonymous",
            agent: "controller",
        }
    }

    pub fn with_response(mut self, response: &'a str) -> Self {
        self.response = Some(response);
        self
    }

    pub fn with_model(mut self, model: &'a str) -> Self {
        self.model = model;
        self
    }

    pub fn with_user(mut self, user: &'a str) -> Self {
        self.user = user;
        self
    }

    pub fn with_agent(mut self, agent: &'a str) -> Self {
        self.agent = agent;
        self
    }
}

#[derive(Debug, Default)]
struct ScanCounters {
    total_scans: AtomicU64,
    prompts_scanned: AtomicU64,
    responses_scanned: AtomicU64,
    threats_detected: AtomicU64,
    blocked_requests: AtomicU64,
}

#[derive(Debug)]
struct ActivationState {
    status: ActivationStatus,
    last_error: Option<String>,
}

/// Snapshot of the scanner's counters and connection state.
#[derive(Debug, Clone, Serialize)]
pub struct ScanStatistics {
    pub total_scans: u64,
    pub prompts_scanned: u64,
    pub responses_scanned: u64,
    pub threats_detected: u64,
    pub blocked_requests: u64,
    /// Percentage of scans that detected a threat.
    pub threat_rate: f64,
    pub enabled: bool,
    pub activation_status: String,
    pub last_error: Option<String>,
    pub config: ScanConfigEcho,
}

/// The effective scan configuration, echoed in statistics output.
#[derive(Debug, Clone, Serialize)]
pub struct ScanConfigEcho {
    pub app_name: String,
    pub profile_name: String,
    pub scan_prompts: bool,
    pub scan_responses: bool,
    pub block_on_threat: bool,
}

/// Threat scanner backed by the AIRS synchronous scan API.
///
/// Every failure path fails OPEN: a broken or slow security backend
/// stops providing protection but never blocks legitimate traffic.
/// Statistics and activation status live for the lifetime of the
/// instance; independent instances do not share state.
#[derive(Debug)]
pub struct AirsScanner {
    client: reqwest::Client,
    base_url: String,
    enabled: bool,
    app_name: String,
    profile_name: String,
    scan_prompts: bool,
    scan_responses: bool,
    block_on_threat: bool,
    timeout: Duration,
    counters: ScanCounters,
    activation: Mutex<ActivationState>,
}

impl AirsScanner {
    /// Creates a scanner from the security section of the config.
    ///
    /// A missing or empty API key disables scanning entirely; every
    /// subsequent `scan` call returns `SKIP_DISABLED` without touching
    /// the network.
    pub fn new(config: &SecurityConfig) -> Result<Self, ConciergeError> {
        let api_key = config.api_key.as_deref().unwrap_or("");
        let enabled = !api_key.is_empty();

        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        if enabled {
            let mut token = HeaderValue::from_str(api_key).map_err(|e| {
                ConciergeError::Config(format!("invalid AIRS API key header value: {e}"))
            })?;
            token.set_sensitive(true);
            headers.insert("x-pan-token", token);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ConciergeError::Scanner {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = if enabled {
            info!(
                app_name = %config.app_name,
                profile_name = %config.profile_name,
                "security scanner initialized"
            );
            ActivationStatus::Pending
        } else {
            warn!("AIRS API key not provided, security scanning disabled");
            ActivationStatus::Disabled
        };

        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
            enabled,
            app_name: config.app_name.clone(),
            profile_name: config.profile_name.clone(),
            scan_prompts: config.scan_prompts,
            scan_responses: config.scan_responses,
            block_on_threat: config.block_on_threat,
            timeout: Duration::from_secs(config.timeout_secs),
            counters: ScanCounters::default(),
            activation: Mutex::new(ActivationState {
                status,
                last_error: None,
            }),
        })
    }

    /// Overrides the scan endpoint base URL (used by tests).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// Whether a credential is configured and scanning can run.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether detected threats block traffic (vs log-only).
    pub fn blocks_on_threat(&self) -> bool {
        self.block_on_threat
    }

    pub fn activation_status(&self) -> ActivationStatus {
        self.activation.lock().expect("activation lock poisoned").status
    }

    /// Scan a prompt and optionally a response for threats.
    ///
    /// Never returns an error: skip gates yield `SKIP_DISABLED` /
    /// `SKIP_CONFIG` verdicts, and every remote failure yields a
    /// fail-open verdict (`ERROR`, `TIMEOUT`, or `PARSE_ERROR` with
    /// `is_safe: true`).
    pub async fn scan(&self, input: ScanInput<'_>) -> ScanOutcome {
        if !self.enabled {
            return ScanOutcome::skipped(ScanAction::SkipDisabled);
        }

        let scan_prompt = self.scan_prompts && !input.prompt.is_empty();
        let scan_response =
            self.scan_responses && input.response.is_some_and(|r| !r.is_empty());

        if !scan_prompt && !scan_response {
            return ScanOutcome::skipped(ScanAction::SkipConfig);
        }

        self.counters.total_scans.fetch_add(1, Ordering::Relaxed);
        if scan_prompt {
            self.counters.prompts_scanned.fetch_add(1, Ordering::Relaxed);
        }
        if scan_response {
            self.counters.responses_scanned.fetch_add(1, Ordering::Relaxed);
        }

        let request = self.build_request(&input, scan_prompt, scan_response);
        let started = Instant::now();

        let response = match self
            .client
            .post(format!("{}{SYNC_SCAN_PATH}", self.base_url))
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                let message = format!("scan timed out after {}s", self.timeout.as_secs());
                error!(agent = input.agent, "{message}");
                self.record_failure(ActivationStatus::Timeout, message);
                return ScanOutcome::fail_open(
                    ScanAction::Timeout,
                    json!({"error": "scan timeout"}),
                );
            }
            Err(e) => {
                let message = format!("scan request failed: {e}");
                error!(agent = input.agent, "{message}");
                self.record_failure(ActivationStatus::Error, message.clone());
                return ScanOutcome::fail_open(ScanAction::Error, json!({"error": message}));
            }
        };

        let status = response.status();
        if !status.is_success() {
            return self.handle_http_failure(status, input.agent);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                let message = format!("failed to read scan response body: {e}");
                error!(agent = input.agent, "{message}");
                self.record_failure(ActivationStatus::Error, message.clone());
                return ScanOutcome::fail_open(ScanAction::Error, json!({"error": message}));
            }
        };

        let raw: serde_json::Value = match serde_json::from_str(&body) {
            Ok(raw) => raw,
            Err(e) => {
                let message = format!("scan response is not valid JSON: {e}");
                error!(agent = input.agent, "{message}");
                self.record_failure(ActivationStatus::Error, message.clone());
                return ScanOutcome::fail_open(
                    ScanAction::ParseError,
                    json!({"error": message, "raw_response": body}),
                );
            }
        };

        let payload: ScanPayload = match serde_json::from_value(raw.clone()) {
            Ok(payload) => payload,
            Err(e) => {
                let message = format!("unrecognized scan response shape: {e}");
                error!(agent = input.agent, "{message}");
                self.record_failure(ActivationStatus::Error, message.clone());
                return ScanOutcome::fail_open(
                    ScanAction::ParseError,
                    json!({"error": message, "raw_response": raw}),
                );
            }
        };

        let scan_time_ms = started.elapsed().as_secs_f64() * 1000.0;
        let verdict = payload.verdict(self.block_on_threat);

        if verdict.threat_detected {
            self.counters.threats_detected.fetch_add(1, Ordering::Relaxed);
        }
        if verdict.action_taken == ScanAction::Blocked {
            self.counters.blocked_requests.fetch_add(1, Ordering::Relaxed);
        }

        self.record_success();
        self.log_verdict(&verdict, scan_time_ms, input.agent);

        ScanOutcome {
            is_safe: verdict.is_safe,
            threat_detected: verdict.threat_detected,
            threat_type: verdict.threat_type,
            risk_score: verdict.risk_score,
            action_taken: verdict.action_taken,
            scan_time_ms: Some(scan_time_ms),
            details: Some(raw),
        }
    }

    /// Canned user-facing text for a blocked interaction.
    ///
    /// The apology is fixed; the clarification is keyed by threat type,
    /// with a generic "flagged for review" default for types we have no
    /// specific wording for.
    pub fn safe_response(&self, threat_type: Option<&str>) -> String {
        let base = "I'm sorry, but I cannot process this request as it may violate \
                    our security policies. ";

        match threat_type {
            Some(threat_type) => {
                let clarification = match threat_type.to_lowercase().as_str() {
                    "prompt_injection" => {
                        "The input appears to contain prompt injection attempts."
                    }
                    "data_exfiltration" => {
                        "The request may attempt to extract sensitive data."
                    }
                    "malicious_content" => {
                        "The content has been flagged as potentially malicious."
                    }
                    "jailbreak" => "The request appears to bypass safety guidelines.",
                    "pii_exposure" => {
                        "The interaction may expose personally identifiable information."
                    }
                    _ => "The request has been flagged for security review.",
                };
                format!("{base}{clarification}")
            }
            None => format!(
                "{base}Please rephrase your request or contact support if you believe \
                 this is an error."
            ),
        }
    }

    /// Current counters, threat rate, and connection state.
    pub fn statistics(&self) -> ScanStatistics {
        let total_scans = self.counters.total_scans.load(Ordering::Relaxed);
        let threats_detected = self.counters.threats_detected.load(Ordering::Relaxed);
        let threat_rate = if total_scans > 0 {
            threats_detected as f64 / total_scans as f64 * 100.0
        } else {
            0.0
        };

        let activation = self.activation.lock().expect("activation lock poisoned");

        ScanStatistics {
            total_scans,
            prompts_scanned: self.counters.prompts_scanned.load(Ordering::Relaxed),
            responses_scanned: self.counters.responses_scanned.load(Ordering::Relaxed),
            threats_detected,
            blocked_requests: self.counters.blocked_requests.load(Ordering::Relaxed),
            threat_rate,
            enabled: self.enabled,
            activation_status: activation.status.to_string(),
            last_error: activation.last_error.clone(),
            config: ScanConfigEcho {
                app_name: self.app_name.clone(),
                profile_name: self.profile_name.clone(),
                scan_prompts: self.scan_prompts,
                scan_responses: self.scan_responses,
                block_on_threat: self.block_on_threat,
            },
        }
    }

    /// Scan a canned probe and report connection health.
    pub async fn health_check(&self) -> (bool, String) {
        if !self.enabled {
            return (false, "security scanning disabled (no API key)".to_string());
        }

        let probe = ScanInput::prompt("health check test")
            .with_response("test response")
            .with_user("health_check");
        let outcome = self.scan(probe).await;

        match outcome.action_taken {
            ScanAction::Allow | ScanAction::Logged => {
                let scan_time = outcome.scan_time_ms.unwrap_or(0.0);
                (
                    true,
                    format!("AIRS connection healthy (scan time: {scan_time:.0}ms)"),
                )
            }
            _ => {
                let activation = self.activation.lock().expect("activation lock poisoned");
                let message = match activation.status {
                    ActivationStatus::PendingActivation => {
                        "AIRS pending activation - contact Palo Alto support".to_string()
                    }
                    ActivationStatus::AuthFailed => {
                        "AIRS authentication failed - check API key".to_string()
                    }
                    _ => format!(
                        "AIRS connection issue: {}",
                        activation
                            .last_error
                            .clone()
                            .unwrap_or_else(|| outcome.action_taken.to_string())
                    ),
                };
                (false, message)
            }
        }
    }

    fn build_request(
        &self,
        input: &ScanInput<'_>,
        scan_prompt: bool,
        scan_response: bool,
    ) -> ScanRequest {
        let epoch_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);

        ScanRequest {
            metadata: ScanMetadata {
                ai_model: input.model.to_string(),
                app_name: self.app_name.clone(),
                app_user: input.user.to_string(),
                agent_name: input.agent.to_string(),
                timestamp: Utc::now().naive_utc().to_string(),
            },
            contents: vec![ScanContent {
                prompt: if scan_prompt {
                    input.prompt.to_string()
                } else {
                    String::new()
                },
                response: if scan_response {
                    input.response.unwrap_or_default().to_string()
                } else {
                    String::new()
                },
            }],
            tr_id: format!("{epoch_millis}_{}", input.agent),
            ai_profile: AiProfile {
                profile_name: self.profile_name.clone(),
            },
        }
    }

    fn handle_http_failure(&self, status: StatusCode, agent: &str) -> ScanOutcome {
        let (activation, message) = match status {
            StatusCode::FORBIDDEN => (
                ActivationStatus::PendingActivation,
                "API key pending activation. Contact Palo Alto support.".to_string(),
            ),
            StatusCode::UNAUTHORIZED => (
                ActivationStatus::AuthFailed,
                "Authentication failed. Check API key.".to_string(),
            ),
            _ => (
                ActivationStatus::Error,
                format!("scan request failed with HTTP {status}"),
            ),
        };

        error!(agent, %status, "{message}");
        self.record_failure(activation, message.clone());
        ScanOutcome::fail_open(
            ScanAction::Error,
            json!({"error": message, "status_code": status.as_u16()}),
        )
    }

    fn record_success(&self) {
        let mut activation = self.activation.lock().expect("activation lock poisoned");
        activation.status = ActivationStatus::Active;
        activation.last_error = None;
    }

    fn record_failure(&self, status: ActivationStatus, message: String) {
        let mut activation = self.activation.lock().expect("activation lock poisoned");
        activation.status = status;
        activation.last_error = Some(message);
    }

    fn log_verdict(&self, verdict: &crate::types::Verdict, scan_time_ms: f64, agent: &str) {
        if verdict.threat_detected {
            warn!(
                agent,
                threat_type = verdict.threat_type.as_deref(),
                risk_score = verdict.risk_score,
                action = %verdict.action_taken,
                "threat detected"
            );
        } else {
            debug!(agent, scan_time_ms, "scan clean");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>) -> SecurityConfig {
        SecurityConfig {
            api_key: api_key.map(str::to_string),
            ..SecurityConfig::default()
        }
    }

    #[test]
    fn missing_key_disables_scanning() {
        let scanner = AirsScanner::new(&config(None)).unwrap();
        assert!(!scanner.is_enabled());
        assert_eq!(scanner.activation_status(), ActivationStatus::Disabled);
    }

    #[test]
    fn empty_key_disables_scanning() {
        let scanner = AirsScanner::new(&config(Some(""))).unwrap();
        assert!(!scanner.is_enabled());
    }

    #[test]
    fn configured_key_starts_pending() {
        let scanner = AirsScanner::new(&config(Some("test-key"))).unwrap();
        assert!(scanner.is_enabled());
        assert_eq!(scanner.activation_status(), ActivationStatus::Pending);
    }

    #[tokio::test]
    async fn disabled_scanner_skips_without_network() {
        let scanner = AirsScanner::new(&config(None)).unwrap();
        let outcome = scanner.scan(ScanInput::prompt("hello")).await;
        assert!(outcome.is_safe);
        assert_eq!(outcome.action_taken, ScanAction::SkipDisabled);
        assert_eq!(scanner.statistics().total_scans, 0);
    }

    #[tokio::test]
    async fn nothing_to_scan_skips_without_network() {
        let mut cfg = config(Some("test-key"));
        cfg.scan_prompts = false;
        cfg.scan_responses = false;
        let scanner = AirsScanner::new(&cfg).unwrap();
        let outcome = scanner.scan(ScanInput::prompt("hello")).await;
        assert_eq!(outcome.action_taken, ScanAction::SkipConfig);
        assert_eq!(scanner.statistics().total_scans, 0);
    }

    #[test]
    fn safe_response_names_known_threat_types() {
        let scanner = AirsScanner::new(&config(Some("k"))).unwrap();
        assert!(
            scanner
                .safe_response(Some("prompt_injection"))
                .contains("prompt injection")
        );
        assert!(
            scanner
                .safe_response(Some("JAILBREAK"))
                .contains("bypass safety guidelines")
        );
        assert!(
            scanner
                .safe_response(Some("something_new"))
                .contains("flagged for security review")
        );
        assert!(scanner.safe_response(None).contains("rephrase your request"));
    }

    #[test]
    fn statistics_start_at_zero() {
        let scanner = AirsScanner::new(&config(Some("k"))).unwrap();
        let stats = scanner.statistics();
        assert_eq!(stats.total_scans, 0);
        assert_eq!(stats.threat_rate, 0.0);
        assert!(stats.enabled);
        assert_eq!(stats.activation_status, "pending");
        assert_eq!(stats.last_error, None);
    }

    #[tokio::test]
    async fn disabled_health_check_reports_unhealthy() {
        let scanner = AirsScanner::new(&config(None)).unwrap();
        let (healthy, message) = scanner.health_check().await;
        assert!(!healthy);
        assert!(message.contains("disabled"));
    }
}
