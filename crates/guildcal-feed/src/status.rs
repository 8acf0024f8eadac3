//! Per-feed load status.

use std::fmt;

use guildcal_core::NormalizedEvent;

use crate::error::FeedResult;

/// A one-line summary of how loading a feed went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    /// No URL configured.
    NoLink,
    /// The feed loaded with this many events in range.
    Loaded(usize),
    /// The feed loaded but had no events in range.
    NoEvents,
    /// Loading failed.
    Error(String),
}

impl FeedStatus {
    /// Summarises the outcome of one pipeline invocation for `url`.
    pub fn from_outcome(url: &str, outcome: &FeedResult<Vec<NormalizedEvent>>) -> Self {
        if url.trim().is_empty() {
            return Self::NoLink;
        }
        match outcome {
            Ok(events) if events.is_empty() => Self::NoEvents,
            Ok(events) => Self::Loaded(events.len()),
            Err(e) => Self::Error(e.to_string()),
        }
    }

    /// Returns true if loading failed.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for FeedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLink => write!(f, "No Link"),
            Self::Loaded(count) => write!(f, "Loaded {}", count),
            Self::NoEvents => write!(f, "No Events"),
            Self::Error(message) => write!(f, "Error: {}", message),
        }
    }
}
