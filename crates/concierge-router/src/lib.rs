// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent classification and query orchestration.
//!
//! The [`QueryRouter`] drives one query at a time through pre-scan,
//! classification, dispatch, post-scan, and history recording. Its
//! collaborators (completion provider, weather, events, recommender,
//! retriever, image generator, threat scanner) are trait objects, so
//! the whole pipeline runs against mocks in tests.

pub mod classifier;
pub mod fallback;
pub mod router;
pub mod time;

pub use classifier::IntentClassifier;
pub use fallback::FallbackHandler;
pub use router::{Collaborators, QueryRouter, RouterOptions, TurnState};
