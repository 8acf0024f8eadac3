//! Recurrence rule parsing and expansion.
//!
//! Only fixed-interval daily and weekly rules are expanded, and always for a
//! fixed number of occurrences. `COUNT`, `UNTIL`, `BYDAY` and friends are not
//! read.

use std::sync::LazyLock;

use chrono::Duration;
use guildcal_core::NormalizedEvent;
use regex::Regex;

static INTERVAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"INTERVAL=([0-9]+)").expect("interval regex should be valid"));

/// How often a rule repeats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Frequency {
    /// No recognized frequency; the rule is present but not expanded.
    #[default]
    Unsupported,
    /// Every `interval` days.
    Daily,
    /// Every `interval` weeks.
    Weekly,
}

/// A parsed recurrence rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceRule {
    /// The repeat frequency.
    pub frequency: Frequency,
    /// Step multiplier, always at least 1.
    pub interval: u32,
}

impl Default for RecurrenceRule {
    fn default() -> Self {
        Self {
            frequency: Frequency::Unsupported,
            interval: 1,
        }
    }
}

impl RecurrenceRule {
    /// Parses a recurrence rule line.
    ///
    /// `FREQ=WEEKLY` and `FREQ=DAILY` are recognized (DAILY wins if both
    /// appear). `INTERVAL=<digits>` overrides the default interval of 1 when
    /// it is a positive number that fits in `u32`.
    pub fn parse(line: &str) -> Self {
        let mut rule = Self::default();

        if line.contains("FREQ=WEEKLY") {
            rule.frequency = Frequency::Weekly;
        }
        if line.contains("FREQ=DAILY") {
            rule.frequency = Frequency::Daily;
        }

        if let Some(interval) = INTERVAL_PATTERN
            .captures(line)
            .and_then(|caps| caps[1].parse::<u32>().ok())
            .filter(|interval| *interval > 0)
        {
            rule.interval = interval;
        }

        rule
    }

    /// Returns true if this rule produces extra occurrences.
    pub fn is_expandable(&self) -> bool {
        self.frequency != Frequency::Unsupported
    }

    /// Returns the distance between two occurrences, if the rule is expandable.
    pub fn step(&self) -> Option<Duration> {
        let days = match self.frequency {
            Frequency::Daily => i64::from(self.interval),
            Frequency::Weekly => 7 * i64::from(self.interval),
            Frequency::Unsupported => return None,
        };
        Some(Duration::days(days))
    }
}

/// How many extra occurrences each frequency produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionLimits {
    /// Occurrences added after the base event of a weekly rule.
    pub weekly: usize,
    /// Occurrences added after the base event of a daily rule.
    pub daily: usize,
}

impl ExpansionLimits {
    /// Default number of weekly occurrences (about one year).
    pub const DEFAULT_WEEKLY: usize = 52;
    /// Default number of daily occurrences (about two months).
    pub const DEFAULT_DAILY: usize = 60;

    /// Sets the weekly limit.
    pub fn with_weekly(mut self, weekly: usize) -> Self {
        self.weekly = weekly;
        self
    }

    /// Sets the daily limit.
    pub fn with_daily(mut self, daily: usize) -> Self {
        self.daily = daily;
        self
    }

    /// Returns the limit for a frequency.
    pub fn for_frequency(&self, frequency: Frequency) -> usize {
        match frequency {
            Frequency::Weekly => self.weekly,
            Frequency::Daily => self.daily,
            Frequency::Unsupported => 0,
        }
    }
}

impl Default for ExpansionLimits {
    fn default() -> Self {
        Self {
            weekly: Self::DEFAULT_WEEKLY,
            daily: Self::DEFAULT_DAILY,
        }
    }
}

/// Generates the occurrences that follow `base` under `rule`.
///
/// The base event itself is not included. Expansion runs forward only and
/// stops early if a date would leave chrono's representable range.
pub fn expand(
    base: &NormalizedEvent,
    rule: &RecurrenceRule,
    limits: &ExpansionLimits,
) -> Vec<NormalizedEvent> {
    let Some(step) = rule.step() else {
        return Vec::new();
    };

    let count = limits.for_frequency(rule.frequency);
    std::iter::successors(base.shifted(step), |prev| prev.shifted(step))
        .take(count)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    mod parse {
        use super::*;

        #[test]
        fn weekly_default_interval() {
            let rule = RecurrenceRule::parse("RRULE:FREQ=WEEKLY;BYDAY=TU");
            assert_eq!(rule.frequency, Frequency::Weekly);
            assert_eq!(rule.interval, 1);
            assert!(rule.is_expandable());
        }

        #[test]
        fn daily_with_interval() {
            let rule = RecurrenceRule::parse("RRULE:FREQ=DAILY;INTERVAL=3");
            assert_eq!(rule.frequency, Frequency::Daily);
            assert_eq!(rule.interval, 3);
        }

        #[test]
        fn unsupported_frequency() {
            let rule = RecurrenceRule::parse("RRULE:FREQ=MONTHLY;INTERVAL=2");
            assert_eq!(rule.frequency, Frequency::Unsupported);
            assert_eq!(rule.interval, 2);
            assert!(!rule.is_expandable());
            assert_eq!(rule.step(), None);
        }

        #[test]
        fn bad_intervals_fall_back_to_one() {
            assert_eq!(RecurrenceRule::parse("RRULE:FREQ=DAILY;INTERVAL=0").interval, 1);
            assert_eq!(RecurrenceRule::parse("RRULE:FREQ=DAILY;INTERVAL=x").interval, 1);
            assert_eq!(
                RecurrenceRule::parse("RRULE:FREQ=DAILY;INTERVAL=99999999999").interval,
                1
            );
        }

        #[test]
        fn daily_wins_over_weekly() {
            let rule = RecurrenceRule::parse("RRULE:FREQ=WEEKLY;X-ALT=FREQ=DAILY");
            assert_eq!(rule.frequency, Frequency::Daily);
        }

        #[test]
        fn steps() {
            let weekly = RecurrenceRule::parse("RRULE:FREQ=WEEKLY;INTERVAL=2");
            assert_eq!(weekly.step(), Some(Duration::days(14)));
            let daily = RecurrenceRule::parse("RRULE:FREQ=DAILY");
            assert_eq!(daily.step(), Some(Duration::days(1)));
        }
    }

    mod expansion {
        use super::*;

        fn base() -> NormalizedEvent {
            NormalizedEvent::new("Raid Night", dt(2025, 1, 7, 20, 0)).with_description("gear")
        }

        #[test]
        fn weekly_produces_52_occurrences() {
            let rule = RecurrenceRule::parse("RRULE:FREQ=WEEKLY");
            let events = expand(&base(), &rule, &ExpansionLimits::default());
            assert_eq!(events.len(), 52);
            assert_eq!(events[0].start, dt(2025, 1, 14, 20, 0));
            assert_eq!(events[51].start, dt(2026, 1, 6, 20, 0));
            assert!(events.iter().all(|e| e.title == "Raid Night" && e.description == "gear"));
        }

        #[test]
        fn daily_produces_60_occurrences() {
            let rule = RecurrenceRule::parse("RRULE:FREQ=DAILY;INTERVAL=2");
            let events = expand(&base(), &rule, &ExpansionLimits::default());
            assert_eq!(events.len(), 60);
            assert_eq!(events[0].start, dt(2025, 1, 9, 20, 0));
            assert_eq!(events[59].start, dt(2025, 5, 7, 20, 0));
        }

        #[test]
        fn wall_clock_is_kept_across_dst() {
            let rule = RecurrenceRule::parse("RRULE:FREQ=WEEKLY");
            let events = expand(&base(), &rule, &ExpansionLimits::default());
            assert!(events.iter().all(|e| e.start.time() == base().start.time()));
        }

        #[test]
        fn unsupported_rule_adds_nothing() {
            let rule = RecurrenceRule::parse("RRULE:FREQ=YEARLY");
            assert!(expand(&base(), &rule, &ExpansionLimits::default()).is_empty());
        }

        #[test]
        fn custom_limits() {
            let limits = ExpansionLimits::default().with_weekly(3).with_daily(0);
            let weekly = RecurrenceRule::parse("RRULE:FREQ=WEEKLY");
            let daily = RecurrenceRule::parse("RRULE:FREQ=DAILY");
            assert_eq!(expand(&base(), &weekly, &limits).len(), 3);
            assert!(expand(&base(), &daily, &limits).is_empty());
        }

        #[test]
        fn stops_at_end_of_representable_time() {
            let near_end = NaiveDateTime::MAX - Duration::days(10);
            let event = NormalizedEvent::new("Far future", near_end);
            let rule = RecurrenceRule::parse("RRULE:FREQ=WEEKLY");
            assert_eq!(expand(&event, &rule, &ExpansionLimits::default()).len(), 1);
        }
    }
}
