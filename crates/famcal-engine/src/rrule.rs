//! Recurrence rule types for the supported RRULE subset (RFC 5545 §3.3.10).

use std::collections::BTreeSet;
use std::fmt;
use std::num::NonZeroU32;

use chrono::{DateTime, Datelike, Utc};

mod parse;

pub use parse::parse_rule;

/// Recurrence frequency.
///
/// Only the three frequencies the service actually stores are representable;
/// the parser rejects the rest of RFC 5545's FREQ values as unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
        }
    }

    /// Parses a frequency from a string (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "DAILY" => Self::Daily,
            "WEEKLY" => Self::Weekly,
            "MONTHLY" => Self::Monthly,
            _ => return None,
        })
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Day of the week.
///
/// Ordered Monday-first so that sorted by-day sets enumerate a week in
/// generation order (the grammar's implicit WKST=MO).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Returns the two-letter abbreviation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "MO",
            Self::Tuesday => "TU",
            Self::Wednesday => "WE",
            Self::Thursday => "TH",
            Self::Friday => "FR",
            Self::Saturday => "SA",
            Self::Sunday => "SU",
        }
    }

    /// Parses a weekday from a two-letter abbreviation (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "MO" => Self::Monday,
            "TU" => Self::Tuesday,
            "WE" => Self::Wednesday,
            "TH" => Self::Thursday,
            "FR" => Self::Friday,
            "SA" => Self::Saturday,
            "SU" => Self::Sunday,
            _ => return None,
        })
    }

    /// Returns all weekdays in order (Monday through Sunday).
    #[must_use]
    pub const fn all() -> [Self; 7] {
        [
            Self::Monday,
            Self::Tuesday,
            Self::Wednesday,
            Self::Thursday,
            Self::Friday,
            Self::Saturday,
            Self::Sunday,
        ]
    }

    /// Returns the offset from Monday (0-6).
    #[must_use]
    pub const fn days_from_monday(self) -> u8 {
        match self {
            Self::Monday => 0,
            Self::Tuesday => 1,
            Self::Wednesday => 2,
            Self::Thursday => 3,
            Self::Friday => 4,
            Self::Saturday => 5,
            Self::Sunday => 6,
        }
    }

    /// Returns the weekday `days` whole days later (negative values go
    /// backwards); wraps around the week.
    #[must_use]
    pub fn shifted(self, days: i64) -> Self {
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "rem_euclid(7) bounds the index to 0..=6"
        )]
        let idx = (i64::from(self.days_from_monday()) + days).rem_euclid(7) as usize;
        Self::all()[idx]
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(wd: chrono::Weekday) -> Self {
        match wd {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns the weekday of an instant read in UTC.
#[must_use]
pub fn utc_weekday(instant: DateTime<Utc>) -> Weekday {
    Weekday::from(instant.weekday())
}

/// Frequency-specific recurrence shape.
///
/// Frequency-specific fields live on the variant, so combinations the engine
/// does not evaluate (a by-day set on a daily rule) cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrencePattern {
    /// Every `interval` days.
    Daily,
    /// The listed weekdays of every `interval`-th week. An empty set means
    /// the weekday of the series start, read in UTC.
    Weekly { by_day: BTreeSet<Weekday> },
    /// The series start's day-of-month every `interval` months, clipped to
    /// the last valid day of shorter months.
    Monthly,
}

impl RecurrencePattern {
    /// Returns the frequency of this pattern.
    #[must_use]
    pub const fn frequency(&self) -> Frequency {
        match self {
            Self::Daily => Frequency::Daily,
            Self::Weekly { .. } => Frequency::Weekly,
            Self::Monthly => Frequency::Monthly,
        }
    }
}

/// Recurrence rule over the supported subset.
///
/// Parsed once per expansion request and never mutated afterwards. Repairing
/// a rule whose stored weekday diverged from the stored UTC start means
/// deriving a fresh rule with [`RecurrenceRule::rederived_for`], not editing
/// this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    /// Frequency-specific shape.
    pub pattern: RecurrencePattern,

    /// Every Nth period (default 1).
    pub interval: NonZeroU32,

    /// Inclusive bound: no occurrence starts after this instant.
    pub until: Option<DateTime<Utc>>,

    /// Cap on total occurrences, counted from the series start. When both
    /// `until` and `count` are present, whichever bound is reached first
    /// wins.
    pub count: Option<NonZeroU32>,
}

impl RecurrenceRule {
    /// Creates a daily recurrence rule.
    #[must_use]
    pub const fn daily() -> Self {
        Self::new(RecurrencePattern::Daily)
    }

    /// Creates a weekly recurrence rule with an empty by-day set.
    #[must_use]
    pub const fn weekly() -> Self {
        Self::new(RecurrencePattern::Weekly {
            by_day: BTreeSet::new(),
        })
    }

    /// Creates a monthly recurrence rule.
    #[must_use]
    pub const fn monthly() -> Self {
        Self::new(RecurrencePattern::Monthly)
    }

    const fn new(pattern: RecurrencePattern) -> Self {
        Self {
            pattern,
            interval: NonZeroU32::MIN,
            until: None,
            count: None,
        }
    }

    /// Sets the interval.
    #[must_use]
    pub fn with_interval(mut self, interval: NonZeroU32) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the occurrence count.
    #[must_use]
    pub fn with_count(mut self, count: NonZeroU32) -> Self {
        self.count = Some(count);
        self
    }

    /// Sets the inclusive until bound.
    #[must_use]
    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    /// Sets the weekly by-day set.
    ///
    /// Leaves non-weekly patterns unchanged; the parser is the only place a
    /// by-day list can reach a non-weekly rule, and it rejects that earlier.
    #[must_use]
    pub fn with_by_day(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        if let RecurrencePattern::Weekly { ref mut by_day } = self.pattern {
            *by_day = days.into_iter().collect();
        }
        self
    }

    /// Returns a new rule whose weekly by-day set is re-derived from the
    /// stored UTC start.
    ///
    /// This is the repair path for records whose stored by-day diverged from
    /// the stored UTC instant (weekly events rendering on the wrong day).
    /// Non-weekly patterns are returned unchanged.
    #[must_use]
    pub fn rederived_for(&self, start_utc: DateTime<Utc>) -> Self {
        let mut rederived = self.clone();
        if let RecurrencePattern::Weekly { ref mut by_day } = rederived.pattern {
            by_day.clear();
            by_day.insert(utc_weekday(start_utc));
        }
        rederived
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = vec![format!("FREQ={}", self.pattern.frequency())];

        if self.interval.get() != 1 {
            parts.push(format!("INTERVAL={}", self.interval));
        }

        if let RecurrencePattern::Weekly { ref by_day } = self.pattern
            && !by_day.is_empty()
        {
            let days: Vec<_> = by_day.iter().map(ToString::to_string).collect();
            parts.push(format!("BYDAY={}", days.join(",")));
        }

        if let Some(ref until) = self.until {
            parts.push(format!("UNTIL={}", until.format("%Y-%m-%dT%H:%M:%SZ")));
        }

        if let Some(count) = self.count {
            parts.push(format!("COUNT={count}"));
        }

        write!(f, "{}", parts.join(";"))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn rule_display_basic() {
        let rule = RecurrenceRule::daily().with_count(NonZeroU32::new(10).unwrap());
        assert_eq!(rule.to_string(), "FREQ=DAILY;COUNT=10");
    }

    #[test]
    fn rule_display_weekly_byday() {
        let rule = RecurrenceRule::weekly().with_by_day([
            Weekday::Monday,
            Weekday::Wednesday,
            Weekday::Friday,
        ]);
        assert_eq!(rule.to_string(), "FREQ=WEEKLY;BYDAY=MO,WE,FR");
    }

    #[test]
    fn rule_display_with_interval_and_until() {
        let until = Utc.with_ymd_and_hms(2025, 12, 20, 0, 0, 0).unwrap();
        let rule = RecurrenceRule::weekly()
            .with_interval(NonZeroU32::new(2).unwrap())
            .with_until(until);
        assert_eq!(
            rule.to_string(),
            "FREQ=WEEKLY;INTERVAL=2;UNTIL=2025-12-20T00:00:00Z"
        );
    }

    #[test]
    fn byday_set_displays_in_week_order() {
        let rule = RecurrenceRule::weekly().with_by_day([Weekday::Sunday, Weekday::Tuesday]);
        assert_eq!(rule.to_string(), "FREQ=WEEKLY;BYDAY=TU,SU");
    }

    #[test]
    fn weekday_parse() {
        assert_eq!(Weekday::parse("MO"), Some(Weekday::Monday));
        assert_eq!(Weekday::parse("fr"), Some(Weekday::Friday));
        assert_eq!(Weekday::parse("XX"), None);
    }

    #[test]
    fn weekday_shifted_wraps() {
        assert_eq!(Weekday::Tuesday.shifted(1), Weekday::Wednesday);
        assert_eq!(Weekday::Sunday.shifted(1), Weekday::Monday);
        assert_eq!(Weekday::Monday.shifted(-1), Weekday::Sunday);
        assert_eq!(Weekday::Thursday.shifted(0), Weekday::Thursday);
    }

    #[test]
    fn frequency_parse() {
        assert_eq!(Frequency::parse("DAILY"), Some(Frequency::Daily));
        assert_eq!(Frequency::parse("weekly"), Some(Frequency::Weekly));
        assert_eq!(Frequency::parse("YEARLY"), None);
    }

    #[test]
    fn rederive_weekly_from_start() {
        // Stored start is a Wednesday in UTC; stored rule says Tuesday.
        let start = Utc.with_ymd_and_hms(2025, 9, 3, 0, 30, 0).unwrap();
        let stale = RecurrenceRule::weekly().with_by_day([Weekday::Tuesday]);

        let repaired = stale.rederived_for(start);
        assert_eq!(
            repaired.pattern,
            RecurrencePattern::Weekly {
                by_day: [Weekday::Wednesday].into_iter().collect()
            }
        );
        // The original rule is untouched.
        assert_eq!(
            stale.pattern,
            RecurrencePattern::Weekly {
                by_day: [Weekday::Tuesday].into_iter().collect()
            }
        );
    }
}
