//! Display-field normalization
//!
//! Converts raw API values (unix timestamps, `D.M.YYYY` birth dates, name
//! parts, free text) into the canonical forms written to the records. Every
//! function here is total: bad input yields an empty or absent value.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};

/// Display name used when a comment's author profile cannot be resolved
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Format of every `date` field in a run
pub const DATE_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Format of cutoff dates in configuration and on the command line
pub const CUTOFF_FORMAT: &str = "%d-%m-%Y";

/// Default display offset (UTC+3)
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 3;

/// Formats timestamps and cutoff dates in one fixed display offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateNormalizer {
    offset: FixedOffset,
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::with_offset_hours(DEFAULT_UTC_OFFSET_HOURS)
    }
}

impl DateNormalizer {
    /// Creates a normalizer for a whole-hour UTC offset
    ///
    /// Offsets outside the valid range fall back to UTC.
    pub fn with_offset_hours(hours: i32) -> Self {
        let offset = hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());
        Self { offset }
    }

    /// Formats a unix timestamp as `DD-MM-YYYY HH:MM:SS`
    ///
    /// Missing (zero or negative) and out-of-range timestamps give an empty
    /// string.
    pub fn format_timestamp(&self, timestamp: i64) -> String {
        if timestamp <= 0 {
            return String::new();
        }

        match DateTime::from_timestamp(timestamp, 0) {
            Some(utc) => utc.with_timezone(&self.offset).format(DATE_FORMAT).to_string(),
            None => {
                tracing::debug!(timestamp, "Timestamp out of range");
                String::new()
            }
        }
    }

    /// Unix timestamp of midnight at the start of `date` in the display offset
    pub fn start_of_day(&self, date: NaiveDate) -> i64 {
        let naive = date.and_time(NaiveTime::MIN);
        naive
            .and_local_timezone(self.offset)
            .single()
            .map(|dt| dt.timestamp())
            .unwrap_or_else(|| naive.and_utc().timestamp())
    }
}

/// Parses a `DD-MM-YYYY` cutoff date
pub fn parse_cutoff_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), CUTOFF_FORMAT).ok()
}

/// Reformats a `D.M.YYYY` birth date as `DD-MM-YYYY`
///
/// Partial dates (`D.M`, no year) and anything that is not a real calendar
/// date give `None`.
pub fn normalize_bdate(raw: &str) -> Option<String> {
    let parts: Vec<&str> = raw.trim().split('.').collect();
    let [day, month, year] = parts.as_slice() else {
        return None;
    };

    let day: u32 = day.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    if year.len() != 4 {
        return None;
    }
    let year: i32 = year.parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)?;
    Some(format!("{:02}-{:02}-{:04}", day, month, year))
}

/// Joins first and last name, falling back to [`UNKNOWN_AUTHOR`]
pub fn display_name(first: Option<&str>, last: Option<&str>) -> String {
    let first = first.map(str::trim).unwrap_or_default();
    let last = last.map(str::trim).unwrap_or_default();
    let joined = format!("{} {}", first, last);
    let joined = joined.trim();

    if joined.is_empty() {
        UNKNOWN_AUTHOR.to_string()
    } else {
        joined.to_string()
    }
}

/// Strips NUL characters
///
/// Response bodies are already decoded lossily and CSV quoting covers line
/// breaks, so every other character is kept as sent.
pub fn sanitize_text(raw: &str) -> String {
    raw.replace('\0', "")
}
