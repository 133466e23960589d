// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AIRS threat-scanner client for the Concierge assistant.
//!
//! Submits prompts and responses to the AIRS synchronous scan API and
//! interprets the verdict. The cardinal rule is fail-open: a scanner
//! that is disabled, unreachable, slow, or speaking an unrecognized
//! dialect degrades to "no protection", never to "no service".

pub mod client;
pub mod types;

pub use client::{
    ActivationStatus, AirsScanner, ScanConfigEcho, ScanInput, ScanStatistics,
};
pub use types::{ScanPayload, Verdict};
