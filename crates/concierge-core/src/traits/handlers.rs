// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Handler traits for the specialized backends the router dispatches to.
//!
//! These are external collaborators: the router consumes the interfaces
//! and converts any error into user-visible text at the dispatch
//! boundary, so no handler failure ever escapes a turn.

use async_trait::async_trait;

use crate::error::ConciergeError;
use crate::types::{EventFilter, EventRecord, WeatherReport};

/// Forecast lookup for a location and ISO date.
#[async_trait]
pub trait WeatherHandler: Send + Sync {
    async fn weather(&self, location: &str, date: &str) -> Result<WeatherReport, ConciergeError>;
}

/// Event lookup for an ISO date, with optional filters.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn events_on(
        &self,
        date: &str,
        filter: EventFilter,
    ) -> Result<Vec<EventRecord>, ConciergeError>;
}

/// Turns weather plus candidate events into recommendation text.
#[async_trait]
pub trait Recommender: Send + Sync {
    async fn recommend(
        &self,
        weather: &WeatherReport,
        events: &[EventRecord],
    ) -> Result<String, ConciergeError>;
}

/// Retrieval-augmented answering over a document corpus.
///
/// The returned text may be a "no information" phrase; the router detects
/// those and re-dispatches through the fallback handler.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn lookup(&self, query: &str) -> Result<String, ConciergeError>;
}

/// Image generation from a text prompt. Returns the image URL.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ConciergeError>;
}
