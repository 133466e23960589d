// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./concierge.toml` > `~/.config/concierge/concierge.toml`
//! > `/etc/concierge/concierge.toml` with environment variable overrides via
//! the `CONCIERGE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ConciergeConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/concierge/concierge.toml` (system-wide)
/// 3. `~/.config/concierge/concierge.toml` (user XDG config)
/// 4. `./concierge.toml` (local directory)
/// 5. `CONCIERGE_*` environment variables
pub fn load_config() -> Result<ConciergeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConciergeConfig::default()))
        .merge(Toml::file("/etc/concierge/concierge.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("concierge/concierge.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("concierge.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and for callers that supply config inline.
pub fn load_config_from_str(toml_content: &str) -> Result<ConciergeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConciergeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ConciergeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConciergeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `CONCIERGE_SECURITY_API_KEY` must map
/// to `security.api_key`, not `security.api.key`.
fn env_provider() -> Env {
    Env::prefixed("CONCIERGE_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: CONCIERGE_SECURITY_BLOCK_ON_THREAT -> "security_block_on_threat"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("openai_", "openai.", 1)
            .replacen("security_", "security.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_loader_applies_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.agent.name, "concierge");
        assert_eq!(config.openai.model, "gpt-4");
    }

    #[test]
    fn string_loader_merges_over_defaults() {
        let config = load_config_from_str(
            r#"
[agent]
default_location = "Paris"

[openai]
api_key = "sk-test"
"#,
        )
        .unwrap();
        assert_eq!(config.agent.default_location, "Paris");
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
        // Unset keys still defaulted.
        assert_eq!(config.agent.max_history, 20);
    }

    #[test]
    fn unknown_section_key_is_an_error() {
        let result = load_config_from_str(
            r#"
[security]
blok_on_threat = true
"#,
        );
        assert!(result.is_err());
    }
}
