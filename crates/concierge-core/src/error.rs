// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Concierge assistant.

use thiserror::Error;

/// The primary error type used across all Concierge collaborator traits
/// and core operations.
#[derive(Debug, Error)]
pub enum ConciergeError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// LLM provider errors (API failure, token limits, model not found).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Collaborator handler errors (weather backend, event store, retrieval, image).
    #[error("handler error: {message}")]
    Handler {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Threat scanner errors (transport failure, bad credential, malformed payload).
    ///
    /// These never surface to a caller of the router -- the scanner fails
    /// open -- but the scanner client uses this variant internally.
    #[error("scanner error: {message}")]
    Scanner {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ConciergeError {
    /// Shorthand for a handler error with no underlying source.
    pub fn handler(message: impl Into<String>) -> Self {
        ConciergeError::Handler {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a provider error with no underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        ConciergeError::Provider {
            message: message.into(),
            source: None,
        }
    }
}
