//! # Header Dates
//!
//! Scenario headers carry an ISO-8601 creation date. Reports show it as
//! `DD.MM.YYYY`. Accepted input forms, tried in order:
//!
//! 1. RFC 3339 with offset: `2021-03-15T10:20:30+01:00`, `...Z`
//! 2. Local date-time without offset: `2021-03-15T10:20:30`, with optional
//!    fractional seconds, `T` or space separated
//! 3. Plain date: `2021-03-15`
//!
//! The calendar date is taken as written; offsets are not converted.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::QualityError;

const OUTPUT_FORMAT: &str = "%d.%m.%Y";

/// Reformat an ISO-8601 header date as `DD.MM.YYYY`.
pub fn format_header_date(raw: &str) -> Result<String, QualityError> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.format(OUTPUT_FORMAT).to_string());
    }

    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Ok(dt.format(OUTPUT_FORMAT).to_string());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.format(OUTPUT_FORMAT).to_string())
        .map_err(|e| QualityError::InvalidDate {
            value: raw.to_string(),
            reason: e.to_string(),
        })
}
