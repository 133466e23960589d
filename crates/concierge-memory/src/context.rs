// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Location/date entity extraction with stateful fallback.
//!
//! Pulls a location and an ISO date out of free text. When a query names
//! neither, the last remembered values are reused, so follow-up turns
//! like "and tomorrow?" keep the location of the previous turn. All
//! relative dates resolve against a fixed UTC+8 reference clock.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use regex::Regex;
use tracing::debug;

/// Reference clock offset: UTC+8.
const REFERENCE_OFFSET_SECS: i32 = 8 * 3600;

/// A capitalized phrase preceded by a locative preposition,
/// e.g. "in Paris", "near Kuala Lumpur".
static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:in|at|for|near|of)\s+([A-Z][a-z]+(?:\s[A-Z][a-z]+)*)").unwrap()
});

/// An explicit ISO date token.
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").unwrap());

static TODAY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\btoday\b").unwrap());
static TOMORROW_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\btomorrow\b").unwrap());
static TONIGHT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\btonight\b").unwrap());

/// Stateful location/date extractor.
///
/// Remembered values are only ever overwritten by a fresh explicit
/// extraction from the current query, never by a fallback, and never
/// regress to the seed default.
#[derive(Debug, Clone)]
pub struct ConversationContext {
    last_location: String,
    last_date: Option<String>,
}

impl ConversationContext {
    /// Create a context seeded with the given default location.
    pub fn new(default_location: impl Into<String>) -> Self {
        Self {
            last_location: default_location.into(),
            last_date: None,
        }
    }

    /// Extract `(location, date)` from a query using the real clock.
    pub fn extract(&mut self, query: &str) -> (String, String) {
        self.extract_at(query, Utc::now().with_timezone(&reference_offset()))
    }

    /// Extract `(location, date)` resolving relative dates against `now`.
    ///
    /// Always returns a pair of non-empty strings; there are no error
    /// conditions.
    pub fn extract_at(&mut self, query: &str, now: DateTime<FixedOffset>) -> (String, String) {
        let location = match LOCATION_RE.captures(query) {
            Some(caps) => {
                let found = caps[1].to_string();
                self.last_location = found.clone();
                found
            }
            None => self.last_location.clone(),
        };

        let extracted_date = if let Some(caps) = DATE_RE.captures(query) {
            Some(caps[1].to_string())
        } else if TODAY_RE.is_match(query) || TONIGHT_RE.is_match(query) {
            Some(now.format("%Y-%m-%d").to_string())
        } else if TOMORROW_RE.is_match(query) {
            Some((now + Duration::days(1)).format("%Y-%m-%d").to_string())
        } else {
            None
        };

        let date = match extracted_date {
            Some(fresh) => {
                self.last_date = Some(fresh.clone());
                fresh
            }
            None => match &self.last_date {
                Some(remembered) => remembered.clone(),
                None => {
                    // First turn with no date at all: "now" becomes the
                    // remembered date.
                    let fallback = now.format("%Y-%m-%d").to_string();
                    self.last_date = Some(fallback.clone());
                    fallback
                }
            },
        };

        debug!(location = %location, date = %date, "extracted conversation entities");
        (location, date)
    }

    /// The currently remembered location.
    pub fn last_location(&self) -> &str {
        &self.last_location
    }

    /// The currently remembered date, if any turn has resolved one.
    pub fn last_date(&self) -> Option<&str> {
        self.last_date.as_deref()
    }

    /// Reset remembered values back to the given seed location.
    pub fn reset(&mut self, default_location: impl Into<String>) {
        self.last_location = default_location.into();
        self.last_date = None;
    }
}

/// The fixed UTC+8 reference offset used for relative date resolution.
pub fn reference_offset() -> FixedOffset {
    FixedOffset::east_opt(REFERENCE_OFFSET_SECS).expect("UTC+8 is a valid offset")
}
