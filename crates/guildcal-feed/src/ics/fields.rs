//! Field decoding for event blocks.
//!
//! Classifies a trimmed logical line into one of the fields the pipeline
//! reads and decodes backslash escapes in free text.

/// Marker that opens an event block.
pub const BEGIN_EVENT: &str = "BEGIN:VEVENT";
/// Marker that closes an event block.
pub const END_EVENT: &str = "END:VEVENT";

const SUMMARY_PREFIX: &str = "SUMMARY:";
const DESCRIPTION_PREFIX: &str = "DESCRIPTION:";
// Matches parameterized forms too, e.g. `DTSTART;TZID=...:` and `DTSTART;VALUE=DATE:`.
const DTSTART_PREFIX: &str = "DTSTART";
const RRULE_PREFIX: &str = "RRULE:";

/// A recognized line inside an event block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<'a> {
    /// Event title, already trimmed.
    Summary(&'a str),
    /// Raw description text after the colon, still escaped.
    Description(&'a str),
    /// Start date/time value after the colon, trimmed.
    Start(&'a str),
    /// The whole recurrence rule line.
    Rule(&'a str),
}

impl<'a> Field<'a> {
    /// Classifies a trimmed logical line.
    ///
    /// Returns `None` for lines the pipeline does not read.
    pub fn parse(line: &'a str) -> Option<Self> {
        if line.starts_with(SUMMARY_PREFIX) {
            return Some(Self::Summary(value_after_colon(line).trim()));
        }
        if line.starts_with(DESCRIPTION_PREFIX) {
            return Some(Self::Description(value_after_colon(line)));
        }
        if line.starts_with(DTSTART_PREFIX) {
            return Some(Self::Start(value_after_colon(line).trim()));
        }
        if line.starts_with(RRULE_PREFIX) {
            return Some(Self::Rule(line));
        }
        None
    }
}

/// Returns the text after the first colon, or an empty string if there is none.
fn value_after_colon(line: &str) -> &str {
    line.split_once(':').map_or("", |(_, value)| value)
}

/// Decodes backslash escapes in a free-text value.
///
/// `\,` and `\;` are decoded first, then `\n`, `\r` and `\t` become the
/// matching control characters. Each step runs once over the text, so no
/// output of a later step is decoded again.
pub fn unescape_text(value: &str) -> String {
    if !value.contains('\\') {
        return value.to_string();
    }

    value
        .replace("\\,", ",")
        .replace("\\;", ";")
        .replace("\\n", "\n")
        .replace("\\r", "\r")
        .replace("\\t", "\t")
}
