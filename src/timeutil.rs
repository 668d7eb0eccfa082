//! Civil-time helpers for the fixed operating zone.
//!
//! The agency operates on New York time regardless of where the process
//! runs. Everything here is pure apart from `current_time`, which reads
//! the system clock.

use std::time::Duration;

use chrono::{DateTime, Datelike, DurationRound, NaiveDate, NaiveDateTime, Timelike, Utc, Weekday};
use chrono_tz::America::New_York;
use chrono_tz::Tz;

use crate::config::BusinessHours;
use crate::error::InvalidDateError;

/// Format the planner sees, e.g. `Mon 28 Apr 2025, 12:41PM`.
const DISPLAY_FORMAT: &str = "%a %d %b %Y, %I:%M%p";

/// The fixed operating time zone.
pub fn operating_zone() -> Tz {
    New_York
}

/// Current time in the operating zone as a human-readable string.
pub fn current_time() -> String {
    Utc::now()
        .with_timezone(&New_York)
        .format(DISPLAY_FORMAT)
        .to_string()
}

/// Whether the given proleptic Gregorian date falls on a Saturday or
/// Sunday. Errors on an impossible date since that indicates a caller
/// defect, not a runtime condition.
pub fn is_weekend(day: u32, month: u32, year: i32) -> Result<bool, InvalidDateError> {
    let date =
        NaiveDate::from_ymd_opt(year, month, day).ok_or(InvalidDateError { day, month, year })?;
    Ok(matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
}

/// Whether the instant falls inside the business-hour calendar
/// (Monday through Friday, `[open_hour, close_hour)` in the operating
/// zone). Holidays are an external input and not checked here.
pub fn is_business_hours(at: DateTime<Utc>, hours: &BusinessHours) -> bool {
    let local = at.with_timezone(&New_York);
    if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }
    local.hour() >= hours.open_hour && local.hour() < hours.close_hour
}

fn granularity(step: Duration) -> Option<chrono::Duration> {
    chrono::Duration::from_std(step)
        .ok()
        .filter(|g| *g > chrono::Duration::zero())
}

/// Whether the instant lies exactly on a boundary of the given
/// granularity (the operating zone's offset is a whole number of
/// hours, so hour boundaries coincide with UTC's).
pub fn on_boundary(at: DateTime<Utc>, step: Duration) -> bool {
    match granularity(step) {
        Some(g) => at.duration_trunc(g).map(|t| t == at).unwrap_or(false),
        None => true,
    }
}

/// The boundary of the given granularity nearest to the instant
/// (ties round up).
pub fn round_to(at: DateTime<Utc>, step: Duration) -> DateTime<Utc> {
    match granularity(step) {
        Some(g) => at.duration_round(g).unwrap_or(at),
        None => at,
    }
}

/// The first boundary of the given granularity at or after the
/// instant. Never earlier than `at`.
pub fn ceil_to(at: DateTime<Utc>, step: Duration) -> DateTime<Utc> {
    let Some(g) = granularity(step) else {
        return at;
    };
    match at.duration_trunc(g) {
        Ok(floor) if floor == at => at,
        Ok(floor) => floor + g,
        Err(_) => at,
    }
}

/// Parse a planner-supplied maintenance start. Accepts RFC 3339 with an
/// explicit offset, or a naive `YYYY-MM-DD HH:MM` interpreted in the
/// operating zone.
pub fn parse_start(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw.trim()) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%m/%d/%Y %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw.trim(), format) {
            // Ambiguous wall times around a DST fold take the earlier reading.
            return naive
                .and_local_timezone(New_York)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc));
        }
    }
    None
}

/// Render an instant in the operating zone for planner-facing messages.
pub fn display(at: DateTime<Utc>) -> String {
    at.with_timezone(&New_York).format(DISPLAY_FORMAT).to_string()
}
