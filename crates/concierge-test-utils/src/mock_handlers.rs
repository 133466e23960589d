// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted mock implementations of the collaborator handler traits.
//!
//! Each mock returns a fixed scripted value (or a fixed error) and
//! records its invocations, so tests can assert both the routed output
//! and whether a handler was reached at all.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use concierge_core::{
    ConciergeError, EventFilter, EventRecord, EventStore, ImageGenerator, Recommender,
    Retriever, WeatherHandler, WeatherReport,
};

/// A mild default forecast for tests that don't care about the values.
pub fn mild_weather() -> WeatherReport {
    WeatherReport {
        condition: "Partly Cloudy".to_string(),
        temperature_c: 24.0,
        humidity: 60.0,
        wind_speed_kph: 12.0,
        rain_chance: 20.0,
        uv_index: 4.0,
    }
}

/// One indoor and one outdoor sample event.
pub fn sample_events() -> Vec<EventRecord> {
    vec![
        EventRecord {
            name: "Jazz Evening".to_string(),
            kind: "concert".to_string(),
            location: "Esplanade".to_string(),
            price: 45.0,
            capacity: 300,
            indoor: true,
            description: "An evening of live jazz.".to_string(),
            time: "19:30".to_string(),
        },
        EventRecord {
            name: "Garden Picnic".to_string(),
            kind: "outdoor".to_string(),
            location: "Botanic Gardens".to_string(),
            price: 0.0,
            capacity: 500,
            indoor: false,
            description: "Open-air picnic and games.".to_string(),
            time: "11:00".to_string(),
        },
    ]
}

/// Scripted weather handler recording `(location, date)` calls.
pub struct MockWeather {
    report: Result<WeatherReport, String>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockWeather {
    pub fn returning(report: WeatherReport) -> Self {
        Self {
            report: Ok(report),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            report: Err(message.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl WeatherHandler for MockWeather {
    async fn weather(&self, location: &str, date: &str) -> Result<WeatherReport, ConciergeError> {
        self.calls
            .lock()
            .await
            .push((location.to_string(), date.to_string()));
        self.report
            .clone()
            .map_err(ConciergeError::handler)
    }
}

/// Scripted event store recording `(date, filter)` calls.
pub struct MockEvents {
    events: Result<Vec<EventRecord>, String>,
    calls: Arc<Mutex<Vec<(String, EventFilter)>>>,
}

impl MockEvents {
    pub fn returning(events: Vec<EventRecord>) -> Self {
        Self {
            events: Ok(events),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            events: Err(message.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn calls(&self) -> Vec<(String, EventFilter)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl EventStore for MockEvents {
    async fn events_on(
        &self,
        date: &str,
        filter: EventFilter,
    ) -> Result<Vec<EventRecord>, ConciergeError> {
        self.calls.lock().await.push((date.to_string(), filter));
        self.events.clone().map_err(ConciergeError::handler)
    }
}

/// Scripted recommender.
pub struct MockRecommender {
    text: Result<String, String>,
    calls: Arc<Mutex<usize>>,
}

impl MockRecommender {
    pub fn returning(text: impl Into<String>) -> Self {
        Self {
            text: Ok(text.into()),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            text: Err(message.into()),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub async fn call_count(&self) -> usize {
        *self.calls.lock().await
    }
}

#[async_trait]
impl Recommender for MockRecommender {
    async fn recommend(
        &self,
        _weather: &WeatherReport,
        _events: &[EventRecord],
    ) -> Result<String, ConciergeError> {
        *self.calls.lock().await += 1;
        self.text.clone().map_err(ConciergeError::handler)
    }
}

/// Scripted retriever recording queries.
pub struct MockRetriever {
    answer: Result<String, String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockRetriever {
    pub fn returning(answer: impl Into<String>) -> Self {
        Self {
            answer: Ok(answer.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            answer: Err(message.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl Retriever for MockRetriever {
    async fn lookup(&self, query: &str) -> Result<String, ConciergeError> {
        self.calls.lock().await.push(query.to_string());
        self.answer.clone().map_err(ConciergeError::handler)
    }
}

/// Scripted image generator recording prompts.
pub struct MockImages {
    url: Result<String, String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockImages {
    pub fn returning(url: impl Into<String>) -> Self {
        Self {
            url: Ok(url.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            url: Err(message.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl ImageGenerator for MockImages {
    async fn generate(&self, prompt: &str) -> Result<String, ConciergeError> {
        self.calls.lock().await.push(prompt.to_string());
        self.url.clone().map_err(ConciergeError::handler)
    }
}
