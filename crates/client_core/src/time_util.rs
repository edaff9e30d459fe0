//! Formatting helpers for the status page.

use chrono::{DateTime, Local, TimeZone, Utc};
use tracing::warn;

/// Millisecond timestamps below this are assumed to be seconds.
const SECONDS_THRESHOLD: i64 = 10_000_000_000;

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

/// "1 day 1 hour 1 minute". Zero-valued leading units are omitted.
pub fn seconds_to_days_hours_minutes(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;

    let mut parts = Vec::with_capacity(3);
    if days > 0 {
        parts.push(plural(days, "day"));
    }
    if days > 0 || hours > 0 {
        parts.push(plural(hours, "hour"));
    }
    parts.push(plural(minutes, "minute"));
    parts.join(" ")
}

fn to_local(timestamp: i64) -> Option<DateTime<Local>> {
    let millis = if timestamp.abs() < SECONDS_THRESHOLD {
        warn!(timestamp, "timestamp looks like seconds, expected milliseconds");
        timestamp.checked_mul(1000)?
    } else {
        timestamp
    };
    Local.timestamp_millis_opt(millis).single()
}

/// `dd.mm.yyyy HH:MM` in local time. Accepts milliseconds or seconds.
pub fn format_date_time(timestamp: i64) -> String {
    to_local(timestamp)
        .map(|dt| dt.format("%d.%m.%Y %H:%M").to_string())
        .unwrap_or_default()
}

pub fn format_date_time_utc(date: DateTime<Utc>) -> String {
    date.with_timezone(&Local)
        .format("%d.%m.%Y %H:%M")
        .to_string()
}

/// `HH:MM` in local time.
pub fn format_time(timestamp: i64) -> String {
    to_local(timestamp)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "tests/time_util_tests.rs"]
mod tests;
