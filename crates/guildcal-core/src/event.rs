//! Event types for calendar feeds.
//!
//! A [`NormalizedEvent`] is the unit handed to consumers: a title, a civil
//! start time already expressed in the reference zone, and a description
//! with all text escapes decoded.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A calendar occurrence after ingestion and normalization.
///
/// `start` carries no zone: it is wall-clock time in the reference zone the
/// feed was normalized into (see [`crate::ReferenceZone`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    /// The event title/summary.
    pub title: String,
    /// When the occurrence starts, as civil time in the reference zone.
    pub start: NaiveDateTime,
    /// Decoded free-text description (empty when the feed had none).
    pub description: String,
}

impl NormalizedEvent {
    /// Creates a new event with an empty description.
    pub fn new(title: impl Into<String>, start: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            start,
            description: String::new(),
        }
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns the calendar day the occurrence starts on.
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    /// Returns a copy of this event moved forward by `step`.
    ///
    /// Returns `None` if the shifted time leaves chrono's representable range.
    pub fn shifted(&self, step: Duration) -> Option<Self> {
        let start = self.start.checked_add_signed(step)?;
        Some(Self {
            title: self.title.clone(),
            start,
            description: self.description.clone(),
        })
    }
}
