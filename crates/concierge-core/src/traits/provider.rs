// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion provider trait for LLM integrations.

use async_trait::async_trait;

use crate::error::ConciergeError;

/// A single-turn chat completion request.
///
/// The classifier and the fallback handler both issue one-shot requests:
/// a system instruction, one user message, deterministic or mildly
/// creative sampling, and a short output cap.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    /// Output token cap. `None` uses the provider default.
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// A deterministic request (temperature 0) with a short output cap.
    pub fn deterministic(system: impl Into<String>, user: impl Into<String>, max_tokens: u32) -> Self {
        CompletionRequest {
            system: system.into(),
            user: user.into(),
            temperature: 0.0,
            max_tokens: Some(max_tokens),
        }
    }
}

/// Adapter for single-turn chat completion calls.
///
/// One call per request, no retries: a failed remote call is reported
/// immediately and degraded by the caller.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Sends a completion request and returns the response text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, ConciergeError>;
}
