// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `concierge security` command implementation.
//!
//! Prints the scanner's statistics snapshot and runs a live health
//! check against the scan backend.

use colored::Colorize;

use concierge_airs::AirsScanner;
use concierge_config::model::ConciergeConfig;
use concierge_core::ConciergeError;

/// Runs the `concierge security` status report.
pub async fn run_security(config: ConciergeConfig) -> Result<(), ConciergeError> {
    let scanner = AirsScanner::new(&config.security)?;

    let stats = scanner.statistics();
    let rendered = serde_json::to_string_pretty(&stats)
        .map_err(|e| ConciergeError::Internal(format!("failed to render statistics: {e}")))?;
    println!("{}", "scan statistics".bold());
    println!("{rendered}\n");

    println!("{}", "health check".bold());
    let (healthy, message) = scanner.health_check().await;
    if healthy {
        println!("{} {message}", "ok".green());
    } else {
        println!("{} {message}", "unhealthy".red());
    }

    Ok(())
}
