//! Start date/time parsing and normalization.
//!
//! Two encodings are accepted:
//!
//! - `YYYYMMDD`: a date at midnight, used as-is
//! - `YYYYMMDDTHHMM[SS][Z]`: a date-time; with a trailing `Z` it is a UTC
//!   instant and gets converted into the reference zone, otherwise it is
//!   floating civil time and used as-is

use std::ops::Range;

use chrono::{NaiveDate, NaiveDateTime};
use guildcal_core::ReferenceZone;
use thiserror::Error;

/// Why a start value could not be parsed.
///
/// These never end a feed invocation: the extractor treats them as "no
/// date seen" for the line in question.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateTimeError {
    /// Neither an 8-digit date nor a `T`-separated date-time.
    #[error("unrecognized date/time value: {0:?}")]
    Unrecognized(String),

    /// A component at the given offsets is missing or not all digits.
    #[error("invalid digits at {start}..{end} in {value:?}")]
    InvalidDigits {
        value: String,
        start: usize,
        end: usize,
    },

    /// The components do not form a real calendar date/time.
    #[error("date/time out of range: {0:?}")]
    OutOfRange(String),
}

/// Parses a start value and normalizes it into the reference zone.
///
/// Surrounding whitespace is ignored.
pub fn parse_start(value: &str, zone: &ReferenceZone) -> Result<NaiveDateTime, DateTimeError> {
    let value = value.trim();

    if value.len() == 8 && !value.contains('T') {
        return parse_date(value);
    }

    if value.contains('T') {
        let is_utc = value.ends_with('Z');
        let civil = parse_date_time(&value.replace('Z', ""))?;
        return Ok(if is_utc { zone.convert_utc(civil) } else { civil });
    }

    Err(DateTimeError::Unrecognized(value.to_string()))
}

/// Parses `YYYYMMDD` into midnight of that day.
fn parse_date(value: &str) -> Result<NaiveDateTime, DateTimeError> {
    let date = ymd(value)?;
    date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| DateTimeError::OutOfRange(value.to_string()))
}

/// Parses `YYYYMMDDTHHMM[SS]` with the `Z` marker already removed.
fn parse_date_time(value: &str) -> Result<NaiveDateTime, DateTimeError> {
    let date = ymd(value)?;
    let hour = digits(value, 9..11)?;
    let minute = digits(value, 11..13)?;
    let second = if value.len() > 13 {
        digits(value, 13..15)?
    } else {
        0
    };

    date.and_hms_opt(hour, minute, second)
        .ok_or_else(|| DateTimeError::OutOfRange(value.to_string()))
}

fn ymd(value: &str) -> Result<NaiveDate, DateTimeError> {
    let year = digits(value, 0..4)?;
    let month = digits(value, 4..6)?;
    let day = digits(value, 6..8)?;

    i32::try_from(year)
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, month, day))
        .ok_or_else(|| DateTimeError::OutOfRange(value.to_string()))
}

/// Reads the ASCII digits at `range` as a number.
fn digits(value: &str, range: Range<usize>) -> Result<u32, DateTimeError> {
    let invalid = || DateTimeError::InvalidDigits {
        value: value.to_string(),
        start: range.start,
        end: range.end,
    };

    let part = value.get(range.clone()).ok_or_else(invalid)?;
    if !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    part.parse().map_err(|_| invalid())
}
