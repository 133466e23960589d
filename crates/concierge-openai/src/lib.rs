// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI provider adapter for the Concierge assistant.

pub mod client;
pub mod types;

pub use client::OpenAiClient;
