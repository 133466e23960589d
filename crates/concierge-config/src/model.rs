// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Concierge assistant.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Concierge configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConciergeConfig {
    /// Assistant identity and conversation settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// OpenAI completion provider settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// AIRS threat scanning settings.
    #[serde(default)]
    pub security: SecurityConfig,
}

/// Assistant identity and conversation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Location assumed when no query has ever named one.
    #[serde(default = "default_location")]
    pub default_location: String,

    /// Maximum number of exchanges kept in conversation history.
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            default_location: default_location(),
            max_history: default_max_history(),
        }
    }
}

fn default_agent_name() -> String {
    "concierge".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_location() -> String {
    "Singapore".to_string()
}

fn default_max_history() -> usize {
    20
}

/// OpenAI completion provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// OpenAI API key. `None` requires the environment variable override.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for classification and fallback answers.
    #[serde(default = "default_model")]
    pub model: String,

    /// Output token cap for intent classification calls.
    #[serde(default = "default_classifier_max_tokens")]
    pub classifier_max_tokens: u32,

    /// Output token cap for fallback capability-scoped answers.
    #[serde(default = "default_fallback_max_tokens")]
    pub fallback_max_tokens: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            classifier_max_tokens: default_classifier_max_tokens(),
            fallback_max_tokens: default_fallback_max_tokens(),
        }
    }
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_classifier_max_tokens() -> u32 {
    20
}

fn default_fallback_max_tokens() -> u32 {
    80
}

/// AIRS threat scanning configuration.
///
/// Scanning is disabled entirely when `api_key` is absent; the router
/// then skips both scan phases and attaches no security metadata.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    /// AIRS API key. `None` disables threat scanning.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Application name reported in scan metadata.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Deployment profile name reported to the scan service.
    #[serde(default = "default_profile_name")]
    pub profile_name: String,

    /// Scan incoming prompts.
    #[serde(default = "default_true")]
    pub scan_prompts: bool,

    /// Scan produced responses.
    #[serde(default = "default_true")]
    pub scan_responses: bool,

    /// Block interactions on detected threats (vs log-only).
    #[serde(default)]
    pub block_on_threat: bool,

    /// Scan request timeout in seconds.
    #[serde(default = "default_scan_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            app_name: default_app_name(),
            profile_name: default_profile_name(),
            scan_prompts: true,
            scan_responses: true,
            block_on_threat: false,
            timeout_secs: default_scan_timeout_secs(),
        }
    }
}

fn default_app_name() -> String {
    "concierge-assistant".to_string()
}

fn default_profile_name() -> String {
    "concierge-airs-profile".to_string()
}

fn default_true() -> bool {
    true
}

fn default_scan_timeout_secs() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = ConciergeConfig::default();
        assert_eq!(config.agent.name, "concierge");
        assert_eq!(config.agent.default_location, "Singapore");
        assert_eq!(config.agent.max_history, 20);
        assert_eq!(config.openai.model, "gpt-4");
        assert!(config.security.api_key.is_none());
        assert!(config.security.scan_prompts);
        assert!(config.security.scan_responses);
        assert!(!config.security.block_on_threat);
        assert_eq!(config.security.timeout_secs, 5);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let toml_str = r#"
[agent]
name = "test"
max_histroy = 5
"#;
        assert!(toml::from_str::<ConciergeConfig>(toml_str).is_err());
    }

    #[test]
    fn security_section_deserializes() {
        let toml_str = r#"
[security]
api_key = "airs-key"
block_on_threat = true
timeout_secs = 3
"#;
        let config: ConciergeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.security.api_key.as_deref(), Some("airs-key"));
        assert!(config.security.block_on_threat);
        assert_eq!(config.security.timeout_secs, 3);
        // Untouched fields keep their defaults.
        assert!(config.security.scan_prompts);
    }
}
