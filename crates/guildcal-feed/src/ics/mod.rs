//! Line-oriented calendar text parsing.
//!
//! The stages run leaf-first:
//!
//! ```text
//! raw text ──unfold──▶ logical lines ──extract──▶ events (base + occurrences)
//!                                        │
//!                          fields / datetime / recurrence
//! ```
//!
//! Only the parts of the format the pipeline needs are read: `SUMMARY`,
//! `DESCRIPTION`, `DTSTART` and `RRULE` inside `VEVENT` blocks.

pub mod datetime;
pub mod extract;
pub mod fields;
pub mod recurrence;
pub mod unfold;

use guildcal_core::NormalizedEvent;

pub use datetime::{DateTimeError, parse_start};
pub use extract::{BlockState, ExtractOptions, Extraction, extract_events};
pub use fields::{Field, unescape_text};
pub use recurrence::{ExpansionLimits, Frequency, RecurrenceRule, expand};
pub use unfold::{fold_line, unfold_lines};

/// Parses feed text into events, in feed order, without range filtering.
pub fn parse_events(text: &str, options: &ExtractOptions) -> Vec<NormalizedEvent> {
    let lines = unfold_lines(text);
    extract_events(&lines, options)
}
