// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion provider for deterministic testing.
//!
//! `MockProvider` implements `CompletionProvider` with pre-configured
//! responses, enabling fast, CI-runnable tests without external API
//! calls.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use concierge_core::{CompletionProvider, CompletionRequest, ConciergeError};

/// A mock completion provider that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned. Every request is
/// recorded for assertion.
pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<String>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with an empty response queue.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock provider pre-loaded with the given responses.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response to the end of the queue.
    pub async fn add_response(&self, text: String) {
        self.responses.lock().await.push_back(text);
    }

    /// The requests received so far, in call order.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    /// Number of completion calls received so far.
    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ConciergeError> {
        self.requests.lock().await.push(request);
        Ok(self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock response".to_string()))
    }
}

/// A provider that fails every call, for error-path tests.
pub struct FailingProvider {
    message: String,
}

impl FailingProvider {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl CompletionProvider for FailingProvider {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, ConciergeError> {
        Err(ConciergeError::provider(self.message.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(user: &str) -> CompletionRequest {
        CompletionRequest::deterministic("system", user, 20)
    }

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let provider = MockProvider::new();
        let text = provider.complete(request("hi")).await.unwrap();
        assert_eq!(text, "mock response");
    }

    #[tokio::test]
    async fn queued_responses_returned_in_order() {
        let provider =
            MockProvider::with_responses(vec!["first".to_string(), "second".to_string()]);
        assert_eq!(provider.complete(request("a")).await.unwrap(), "first");
        assert_eq!(provider.complete(request("b")).await.unwrap(), "second");
        // Queue exhausted, falls back to default
        assert_eq!(
            provider.complete(request("c")).await.unwrap(),
            "mock response"
        );
    }

    #[tokio::test]
    async fn requests_are_recorded() {
        let provider = MockProvider::new();
        provider.complete(request("one")).await.unwrap();
        provider.complete(request("two")).await.unwrap();

        let requests = provider.requests().await;
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].user, "one");
        assert_eq!(requests[1].user, "two");
        assert_eq!(provider.call_count().await, 2);
    }

    #[tokio::test]
    async fn failing_provider_always_errors() {
        let provider = FailingProvider::new("backend down");
        let err = provider.complete(request("hi")).await.unwrap_err();
        assert!(format!("{err}").contains("backend down"));
    }
}
