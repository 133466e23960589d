// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty identity fields and positive limits.

use crate::diagnostic::ConfigError;
use crate::model::ConciergeConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)`
/// with all collected validation errors (does not fail fast).
pub fn validate_config(config: &ConciergeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.agent.name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "agent.name must not be empty".to_string(),
        });
    }

    if config.agent.default_location.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "agent.default_location must not be empty".to_string(),
        });
    }

    if config.agent.max_history == 0 {
        errors.push(ConfigError::Validation {
            message: "agent.max_history must be at least 1".to_string(),
        });
    }

    if config.openai.model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "openai.model must not be empty".to_string(),
        });
    }

    if config.openai.classifier_max_tokens == 0 {
        errors.push(ConfigError::Validation {
            message: "openai.classifier_max_tokens must be at least 1".to_string(),
        });
    }

    if config.security.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "security.timeout_secs must be at least 1".to_string(),
        });
    }

    // An empty-string key would enable scanning with a credential the
    // service will reject; treat it as "unset" misuse instead.
    if config
        .security
        .api_key
        .as_deref()
        .is_some_and(|key| key.trim().is_empty())
    {
        errors.push(ConfigError::Validation {
            message: "security.api_key must not be an empty string; omit it to disable scanning"
                .to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
