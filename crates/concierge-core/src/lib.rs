// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Concierge assistant.
//!
//! This crate provides the shared error type, the data contracts (intent
//! labels, scan verdicts, routed replies, handler payloads), and the
//! collaborator traits used throughout the Concierge workspace.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ConciergeError;
pub use types::{
    EventFilter, EventRecord, HistoryEntry, Intent, RoutedReply, ScanAction, ScanOutcome,
    SecurityReport, WeatherReport,
};

// Re-export all collaborator traits at crate root.
pub use traits::{
    CompletionProvider, EventStore, ImageGenerator, Recommender, Retriever, WeatherHandler,
};
pub use traits::provider::CompletionRequest;
