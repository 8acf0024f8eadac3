//! Event block extraction.
//!
//! Logical lines are folded through an [`Extraction`] state: `BEGIN:VEVENT`
//! opens a fresh [`BlockState`], field lines fill it in, and `END:VEVENT`
//! turns it into a base event plus any recurrence occurrences.

use chrono::NaiveDateTime;
use guildcal_core::{NormalizedEvent, ReferenceZone};
use tracing::{debug, trace};

use super::datetime::parse_start;
use super::fields::{BEGIN_EVENT, END_EVENT, Field, unescape_text};
use super::recurrence::{ExpansionLimits, RecurrenceRule, expand};

/// Settings that shape how blocks become events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Zone UTC start values are converted into.
    pub zone: ReferenceZone,
    /// Expansion counts for recurring blocks.
    pub limits: ExpansionLimits,
}

/// Fields seen so far in the open block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockState {
    /// Trimmed title, once seen.
    pub title: Option<String>,
    /// Escaped description, once seen.
    pub description: Option<String>,
    /// Last successfully parsed start.
    pub start: Option<NaiveDateTime>,
    /// Recurrence rule, when a rule line was seen.
    pub rule: Option<RecurrenceRule>,
}

impl BlockState {
    /// Records one field. Later lines of the same kind replace earlier ones,
    /// except start values that fail to parse, which are skipped.
    pub fn apply(mut self, field: Field<'_>, zone: &ReferenceZone) -> Self {
        match field {
            Field::Summary(title) => self.title = Some(title.to_string()),
            Field::Description(text) => self.description = Some(text.to_string()),
            Field::Start(value) => match parse_start(value, zone) {
                Ok(start) => self.start = Some(start),
                Err(e) => debug!(error = %e, "Skipping unparsable start value"),
            },
            Field::Rule(line) => self.rule = Some(RecurrenceRule::parse(line)),
        }
        self
    }

    /// Turns a closed block into events.
    ///
    /// Blocks without a title or a start produce nothing.
    pub fn into_events(self, limits: &ExpansionLimits) -> Vec<NormalizedEvent> {
        let (Some(title), Some(start)) = (self.title, self.start) else {
            debug!("Dropping event block without title or start");
            return Vec::new();
        };

        let description = unescape_text(self.description.as_deref().unwrap_or_default());
        let base = NormalizedEvent::new(title, start).with_description(description);

        let mut events = match self.rule {
            Some(ref rule) => expand(&base, rule, limits),
            None => Vec::new(),
        };
        events.insert(0, base);

        debug!(
            title = %events[0].title,
            start = %events[0].start,
            occurrences = events.len(),
            "Extracted event block"
        );

        events
    }
}

/// Accumulated state of a scan over logical lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    open: Option<BlockState>,
    events: Vec<NormalizedEvent>,
}

impl Extraction {
    /// Feeds one logical line into the scan.
    ///
    /// The line is trimmed before markers and fields are matched. A
    /// `BEGIN:VEVENT` inside an open block restarts that block.
    pub fn step(mut self, line: &str, options: &ExtractOptions) -> Self {
        let line = line.trim();

        if line == BEGIN_EVENT {
            self.open = Some(BlockState::default());
            return self;
        }

        let Some(block) = self.open.take() else {
            trace!(line, "Ignoring line outside event block");
            return self;
        };

        if line == END_EVENT {
            self.events.extend(block.into_events(&options.limits));
            return self;
        }

        self.open = Some(match Field::parse(line) {
            Some(field) => block.apply(field, &options.zone),
            None => block,
        });
        self
    }

    /// Returns true while a block is open.
    pub fn in_block(&self) -> bool {
        self.open.is_some()
    }

    /// Ends the scan. A block still open at end of input is discarded.
    pub fn finish(self) -> Vec<NormalizedEvent> {
        if self.open.is_some() {
            debug!("Discarding unterminated event block");
        }
        self.events
    }
}

/// Extracts events from logical lines, in feed order.
pub fn extract_events<S: AsRef<str>>(lines: &[S], options: &ExtractOptions) -> Vec<NormalizedEvent> {
    lines
        .iter()
        .fold(Extraction::default(), |scan, line| scan.step(line.as_ref(), options))
        .finish()
}
