//! Time types for calendar feeds.
//!
//! This module provides [`ReferenceZone`], the single civil zone every
//! UTC-marked timestamp is converted into, and [`EventWindow`], the sliding
//! range used to bound the events returned for a feed.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Months, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::NormalizedEvent;

/// Errors raised while resolving a zone name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZoneError {
    /// The name is not a known IANA zone identifier.
    #[error("unknown time zone: {0}")]
    Unknown(String),
}

/// The civil zone that UTC timestamps are normalized into.
///
/// Defaults to US Eastern (`America/New_York`), with that zone's daylight
/// saving rules applied per instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReferenceZone(Tz);

impl ReferenceZone {
    /// IANA name of the default reference zone.
    pub const DEFAULT_NAME: &'static str = "America/New_York";

    /// Wraps a chrono-tz zone.
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Returns the IANA identifier of the zone.
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Converts a UTC wall-clock value into civil time in this zone.
    pub fn convert_utc(&self, utc: NaiveDateTime) -> NaiveDateTime {
        self.0.from_utc_datetime(&utc).naive_local()
    }

    /// Expresses an instant as civil time in this zone.
    pub fn civil_now(&self, now: DateTime<Utc>) -> NaiveDateTime {
        now.with_timezone(&self.0).naive_local()
    }

    /// Attaches this zone to a civil timestamp.
    ///
    /// Ambiguous fall-back times resolve to the earliest instant; times that
    /// fall in a spring-forward gap do not exist and yield `None`.
    pub fn localize(&self, civil: NaiveDateTime) -> Option<DateTime<Tz>> {
        self.0.from_local_datetime(&civil).earliest()
    }

    /// Re-expresses a civil timestamp of this zone in another zone.
    pub fn in_zone<Z: TimeZone>(&self, civil: NaiveDateTime, zone: &Z) -> Option<DateTime<Z>> {
        self.localize(civil).map(|dt| dt.with_timezone(zone))
    }
}

impl Default for ReferenceZone {
    fn default() -> Self {
        Self(Tz::America__New_York)
    }
}

impl FromStr for ReferenceZone {
    type Err = ZoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        name.parse::<Tz>()
            .map(Self)
            .map_err(|_| ZoneError::Unknown(name.to_string()))
    }
}

impl TryFrom<String> for ReferenceZone {
    type Error = ZoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReferenceZone> for String {
    fn from(zone: ReferenceZone) -> Self {
        zone.name().to_string()
    }
}

impl fmt::Display for ReferenceZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A range of civil time used to bound feed output.
///
/// Both ends are exclusive: an event exactly on `start` or `end` is outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWindow {
    /// Lower bound (exclusive).
    pub start: NaiveDateTime,
    /// Upper bound (exclusive).
    pub end: NaiveDateTime,
}

impl EventWindow {
    /// Default radius of the window around "now", in years.
    pub const DEFAULT_YEARS: u32 = 2;

    /// Creates a window with the given exclusive bounds.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Creates a window reaching `years` calendar years either side of `now`.
    ///
    /// Month arithmetic clamps to the end of month, so Feb 29 maps to Feb 28
    /// in non-leap target years.
    pub fn around(now: NaiveDateTime, years: u32) -> Self {
        let months = Months::new(years.saturating_mul(12));
        Self {
            start: now.checked_sub_months(months).unwrap_or(NaiveDateTime::MIN),
            end: now.checked_add_months(months).unwrap_or(NaiveDateTime::MAX),
        }
    }

    /// Checks whether a civil timestamp lies strictly inside the window.
    pub fn contains(&self, t: NaiveDateTime) -> bool {
        self.start < t && t < self.end
    }

    /// Keeps the events inside the window, in ascending start order.
    ///
    /// Events with equal start times keep their input order.
    pub fn select(&self, mut events: Vec<NormalizedEvent>) -> Vec<NormalizedEvent> {
        events.retain(|event| self.contains(event.start));
        events.sort_by_key(|event| event.start);
        events
    }
}
