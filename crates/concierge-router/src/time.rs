// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Time and date answers, with per-city timezone support.
//!
//! Queries naming a known city are answered in that city's zone;
//! everything else uses the assistant's UTC+8 reference clock. The
//! variant (tomorrow / yesterday / time-only / date-only / combined)
//! is picked by keyword.

use chrono::{DateTime, Duration, FixedOffset, Utc};
use chrono_tz::Tz;

use concierge_memory::reference_offset;

/// City names recognized in time queries, with their zones.
const TIMEZONE_MAP: [(&str, Tz); 15] = [
    ("london", Tz::Europe__London),
    ("new york", Tz::America__New_York),
    ("tokyo", Tz::Asia__Tokyo),
    ("singapore", Tz::Asia__Singapore),
    ("paris", Tz::Europe__Paris),
    ("sydney", Tz::Australia__Sydney),
    ("dubai", Tz::Asia__Dubai),
    ("hong kong", Tz::Asia__Hong_Kong),
    ("los angeles", Tz::America__Los_Angeles),
    ("chicago", Tz::America__Chicago),
    ("toronto", Tz::America__Toronto),
    ("mumbai", Tz::Asia__Kolkata),
    ("beijing", Tz::Asia__Shanghai),
    ("berlin", Tz::Europe__Berlin),
    ("moscow", Tz::Europe__Moscow),
];

/// Answer a time/date query against the current clock.
pub fn handle_time_query(query: &str) -> String {
    render(query, Utc::now())
}

/// Answer a time/date query against an explicit clock (test seam).
pub fn render(query: &str, now_utc: DateTime<Utc>) -> String {
    let lowered = query.to_lowercase();

    let city = TIMEZONE_MAP
        .iter()
        .find(|(name, _)| lowered.contains(name));

    let (now, location_str, tz_name): (DateTime<FixedOffset>, String, Option<String>) =
        match city {
            Some((name, tz)) => (
                now_utc.with_timezone(tz).fixed_offset(),
                format!(" in {}", title_case(name)),
                Some(tz.name().to_string()),
            ),
            None => (
                now_utc.with_timezone(&reference_offset()),
                " (local time)".to_string(),
                None,
            ),
        };

    let tomorrow = now + Duration::days(1);
    let yesterday = now - Duration::days(1);

    let tz_line = |bold: bool| match (&tz_name, bold) {
        (Some(tz), false) => format!("Timezone: {tz}\n"),
        (Some(tz), true) => format!("**Timezone:** {tz}\n"),
        (None, _) => String::new(),
    };

    if lowered.contains("tomorrow") {
        format!(
            "**Tomorrow's Date{location_str}:**\n\n{}\nDay of week: {}\n{}",
            tomorrow.format("%A, %B %d, %Y"),
            tomorrow.format("%A"),
            tz_line(false)
        )
    } else if lowered.contains("yesterday") {
        format!(
            "**Yesterday's Date{location_str}:**\n\n{}\nDay of week: {}\n{}",
            yesterday.format("%A, %B %d, %Y"),
            yesterday.format("%A"),
            tz_line(false)
        )
    } else if lowered.contains("time") && !lowered.contains("date") {
        format!(
            "**Current Time{location_str}:**\n\n{}\n24-hour format: {}\n{}",
            now.format("%I:%M:%S %p"),
            now.format("%H:%M:%S"),
            tz_line(false)
        )
    } else if ["date", "day", "today"].iter().any(|w| lowered.contains(w))
        && !lowered.contains("time")
    {
        format!(
            "**Today's Date{location_str}:**\n\n{}\nDay of week: {}\n{}",
            now.format("%A, %B %d, %Y"),
            now.format("%A"),
            tz_line(false)
        )
    } else {
        format!(
            "**Current Date & Time{location_str}:**\n\n\
             **Date:** {}\n\
             **Time:** {} ({} 24-hour)\n\
             **Day of week:** {}\n\
             {}\n\
             **Tomorrow will be:**\n{}",
            now.format("%A, %B %d, %Y"),
            now.format("%I:%M:%S %p"),
            now.format("%H:%M:%S"),
            now.format("%A"),
            tz_line(true),
            tomorrow.format("%A, %B %d, %Y"),
        )
    }
}

fn title_case(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
