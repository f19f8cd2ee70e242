//! Date classification for listing dates.
//!
//! Sources publish dates in one of three shapes: a `YYYY.MM.DD ~ YYYY.MM.DD`
//! run, a `YYYY-MM-DD HH:MM` showtime, or something else entirely. A listing is
//! active while the last day it covers has not ended relative to the reference
//! instant. All instants are naive local wall-clock times.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Layouts with a time-of-day component, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y.%m.%d %H:%M",
];

/// Date-only layouts, tried in order. These resolve to midnight.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Which branch of the classifier a date string falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DateShape {
    /// Empty or whitespace-only.
    Empty,
    /// Contains `~`; the part after it is the closing day.
    Range,
    /// Contains both `-` and `:`; the leading token is the day.
    Timestamped,
    /// Anything else, handed to the generic parser as-is.
    Freeform,
}

/// Outcome of evaluating a date string against a reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DateVerdict {
    /// No date at all. Treated as inactive.
    Missing,
    /// The string could not be read. Treated as active.
    Unparseable,
    Active,
    Expired,
}

impl DateVerdict {
    pub fn is_active(self) -> bool {
        matches!(self, DateVerdict::Active | DateVerdict::Unparseable)
    }
}

pub fn classify(date_str: &str) -> DateShape {
    if date_str.trim().is_empty() {
        DateShape::Empty
    } else if date_str.contains('~') {
        DateShape::Range
    } else if date_str.contains('-') && date_str.contains(':') {
        DateShape::Timestamped
    } else {
        DateShape::Freeform
    }
}

/// Resolve the instant a listing stops being current, if the string can be read.
pub fn target_instant(date_str: &str) -> Option<NaiveDateTime> {
    match classify(date_str) {
        DateShape::Empty => None,
        DateShape::Range => {
            let end = date_str.split('~').nth(1)?;
            parse_dotted_date(end).and_then(end_of_day)
        }
        DateShape::Timestamped => {
            let day = date_str.trim_start().split(' ').next()?;
            parse_dashed_date(day).and_then(end_of_day)
        }
        DateShape::Freeform => parse_freeform(date_str.trim()),
    }
}

pub fn evaluate(date_str: &str, reference: NaiveDateTime) -> DateVerdict {
    if classify(date_str) == DateShape::Empty {
        return DateVerdict::Missing;
    }

    match target_instant(date_str) {
        None => DateVerdict::Unparseable,
        Some(target) if target >= reference => DateVerdict::Active,
        Some(_) => DateVerdict::Expired,
    }
}

/// True when a listing dated `date_str` is still upcoming at `reference`.
///
/// Missing dates are inactive, but dates that cannot be read are kept.
pub fn is_active(date_str: &str, reference: NaiveDateTime) -> bool {
    evaluate(date_str, reference).is_active()
}

/// Parse a reference instant supplied on the command line.
pub fn parse_reference(input: &str) -> Result<NaiveDateTime> {
    parse_freeform(input.trim())
        .ok_or_else(|| anyhow!("Unrecognized reference instant: '{}'", input))
}

fn end_of_day(date: NaiveDate) -> Option<NaiveDateTime> {
    date.and_hms_milli_opt(23, 59, 59, 999)
}

fn parse_dotted_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim().trim_end_matches('.');
    NaiveDate::parse_from_str(trimmed, "%Y.%m.%d").ok()
}

fn parse_dashed_date(token: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(token, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_freeform(token).map(|dt| dt.date()))
}

/// Generic parsing for strings that match none of the known source shapes.
pub fn parse_freeform(input: &str) -> Option<NaiveDateTime> {
    // Zone-aware layouts first, converted to local wall-clock time.
    if let Ok(date) = DateTime::parse_from_rfc3339(input) {
        return Some(date.with_timezone(&Local).naive_local());
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(input) {
        return Some(date.with_timezone(&Local).naive_local());
    }
    if let Ok(date) = DateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(date.with_timezone(&Local).naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(date) = NaiveDateTime::parse_from_str(input, format) {
            return Some(date);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn test_classify_priority() {
        assert_eq!(classify(""), DateShape::Empty);
        assert_eq!(classify("   "), DateShape::Empty);
        assert_eq!(classify("2025.01.01 ~ 2025.06.15"), DateShape::Range);
        // A range wins even when it also looks timestamped.
        assert_eq!(classify("2025-01-01 10:00 ~ 2025.06.15"), DateShape::Range);
        assert_eq!(classify("2025-06-15 19:00"), DateShape::Timestamped);
        assert_eq!(classify("2025-06-15"), DateShape::Freeform);
        assert_eq!(classify("June 15, 2025"), DateShape::Freeform);
    }

    #[test]
    fn test_empty_is_inactive() {
        let reference = at("2025-06-15T00:00:00");
        assert!(!is_active("", reference));
        assert_eq!(evaluate("  ", reference), DateVerdict::Missing);
    }

    #[test]
    fn test_garbage_is_active() {
        let reference = at("2025-06-15T00:00:00");
        assert!(is_active("garbage-unparseable-date", reference));
        assert_eq!(
            evaluate("garbage-unparseable-date", reference),
            DateVerdict::Unparseable
        );
    }

    #[test]
    fn test_range_end_boundary() {
        let reference = at("2025-06-15T00:00:00");
        assert!(is_active("2025.01.01 ~ 2025.06.15", reference));
        assert!(!is_active("2025.01.01 ~ 2025.06.14", reference));

        // Still active in the last second of the closing day.
        assert!(is_active("2025.01.01 ~ 2025.06.15", at("2025-06-15T23:59:59")));
        assert!(!is_active("2025.01.01 ~ 2025.06.15", at("2025-06-16T00:00:00")));
    }

    #[test]
    fn test_range_tolerates_trailing_dot_and_spacing() {
        let reference = at("2025-06-15T00:00:00");
        assert_eq!(evaluate("2025.01.01~2025.06.20.", reference), DateVerdict::Active);
        assert_eq!(evaluate("2025.01.01 ~ ", reference), DateVerdict::Unparseable);
        assert_eq!(evaluate("2025.01.01 ~ soon", reference), DateVerdict::Unparseable);
    }

    #[test]
    fn test_timestamped_ignores_time_of_day() {
        assert!(is_active("2025-06-15 19:00", at("2025-06-15T23:00:00")));
        assert!(is_active("2025-06-15 09:00", at("2025-06-15T23:00:00")));
        assert!(!is_active("2025-06-14 23:30", at("2025-06-15T00:00:00")));
    }

    #[test]
    fn test_timestamped_with_iso_token() {
        // No space: the whole token is read and only its day is kept.
        let target = target_instant("2025-06-15T19:00:00").unwrap();
        assert_eq!(target, at("2025-06-15T23:59:59") + chrono::Duration::milliseconds(999));
    }

    #[test]
    fn test_freeform_keeps_time_of_day() {
        // Date-only freeform strings resolve to midnight, not end of day.
        assert_eq!(evaluate("2025-06-15", at("2025-06-15T00:00:00")), DateVerdict::Active);
        assert_eq!(evaluate("2025-06-15", at("2025-06-15T12:00:00")), DateVerdict::Expired);
        assert_eq!(evaluate("June 20, 2025", at("2025-06-15T12:00:00")), DateVerdict::Active);
        assert_eq!(evaluate("2025/06/01", at("2025-06-15T12:00:00")), DateVerdict::Expired);
    }

    #[test]
    fn test_parse_reference() {
        assert_eq!(parse_reference("2025-06-15T00:00:00").unwrap(), at("2025-06-15T00:00:00"));
        assert_eq!(parse_reference("2025-06-15").unwrap(), at("2025-06-15T00:00:00"));
        assert!(parse_reference("tomorrow").is_err());
    }
}
