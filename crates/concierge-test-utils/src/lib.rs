// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared test doubles for the Concierge workspace.
//!
//! Everything here is deterministic and network-free: a FIFO-scripted
//! completion provider and scripted implementations of the collaborator
//! handler traits, all with call recording for assertions.

pub mod mock_handlers;
pub mod mock_provider;

pub use mock_handlers::{
    MockEvents, MockImages, MockRecommender, MockRetriever, MockWeather, mild_weather,
    sample_events,
};
pub use mock_provider::{FailingProvider, MockProvider};
