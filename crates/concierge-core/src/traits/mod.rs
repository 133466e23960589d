// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions for the Concierge router.
//!
//! The router only ever talks to its collaborators through these traits,
//! using `#[async_trait]` for dynamic dispatch compatibility. Production
//! adapters and test mocks implement the same seams.

pub mod handlers;
pub mod provider;

// Re-export all traits at the traits module level for convenience.
pub use handlers::{EventStore, ImageGenerator, Recommender, Retriever, WeatherHandler};
pub use provider::CompletionProvider;
