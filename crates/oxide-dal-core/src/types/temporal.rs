//! Canonical text formats for temporal values.
//!
//! Every function here builds its formatter per call; nothing is shared.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::ConversionError;

/// Canonical DATE format (`yyyy-MM-dd`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Canonical TIME format (`HH:mm:ss`, 24-hour clock).
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Canonical TIMESTAMP format (`yyyy-MM-dd HH:mm:ss`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Accepted on input only; drivers commonly write fractional seconds.
const TIME_FORMAT_FRACTION: &str = "%H:%M:%S%.f";
const TIMESTAMP_FORMAT_FRACTION: &str = "%Y-%m-%d %H:%M:%S%.f";
const TIMESTAMP_FORMAT_ISO: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parses a DATE in canonical format.
pub fn parse_date(text: &str) -> Result<NaiveDate, ConversionError> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).map_err(|_| {
        ConversionError::Unparseable {
            text: text.to_string(),
            to: "DATE",
            expected: "yyyy-MM-dd",
        }
    })
}

/// Parses a TIME in canonical format.
pub fn parse_time(text: &str) -> Result<NaiveTime, ConversionError> {
    let text_trimmed = text.trim();
    NaiveTime::parse_from_str(text_trimmed, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(text_trimmed, TIME_FORMAT_FRACTION))
        .map_err(|_| ConversionError::Unparseable {
            text: text.to_string(),
            to: "TIME",
            expected: "HH:mm:ss",
        })
}

/// Parses a TIMESTAMP in canonical format.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime, ConversionError> {
    let text_trimmed = text.trim();
    [
        TIMESTAMP_FORMAT,
        TIMESTAMP_FORMAT_FRACTION,
        TIMESTAMP_FORMAT_ISO,
    ]
    .iter()
    .find_map(|format| NaiveDateTime::parse_from_str(text_trimmed, format).ok())
    .ok_or_else(|| ConversionError::Unparseable {
        text: text.to_string(),
        to: "TIMESTAMP",
        expected: "yyyy-MM-dd HH:mm:ss",
    })
}

/// Formats a DATE in canonical format.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Formats a TIME in canonical format.
#[must_use]
pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Formats a TIMESTAMP in canonical format.
#[must_use]
pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}
