//! Candidate occurrence generation.
//!
//! [`CandidateStarts`] walks a master event's recurrence series and yields
//! the candidate start instants whose occurrence interval overlaps a query
//! window. The sequence is lazy, finite, and strictly increasing, and the
//! generator holds no state between constructions: re-invoking with the same
//! inputs yields the same sequence.

use std::collections::BTreeSet;
use std::num::NonZeroU32;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

use crate::rrule::{RecurrencePattern, RecurrenceRule, Weekday, utc_weekday};

/// Lazy, bounded sequence of candidate occurrence starts.
///
/// `count`, `until`, and the window end are all checked by the single loop
/// guard in [`Iterator::next`]. Candidates whose interval ends at or before
/// the window start are skipped during emission but still count toward
/// `count` — the cap is measured from the series start, not from the window.
pub struct CandidateStarts {
    series: Series,
    duration: Duration,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    until: Option<DateTime<Utc>>,
    remaining: Option<u32>,
    done: bool,
}

impl CandidateStarts {
    /// Creates a generator for one master series against one query window.
    ///
    /// `rule = None` yields the series start alone, iff its occurrence
    /// interval overlaps the window.
    #[must_use]
    pub fn new(
        start_utc: DateTime<Utc>,
        duration: Duration,
        rule: Option<&RecurrenceRule>,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> Self {
        let (series, until, remaining) = match rule {
            None => (Series::single(start_utc), None, None),
            Some(rule) => (
                Series::recurring(start_utc, rule),
                rule.until,
                rule.count.map(NonZeroU32::get),
            ),
        };

        Self {
            series,
            duration,
            range_start,
            range_end,
            until,
            remaining,
            done: false,
        }
    }
}

impl Iterator for CandidateStarts {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<DateTime<Utc>> {
        // until, count, and the window end share this one loop guard.
        while !self.done {
            if self.remaining == Some(0) {
                self.done = true;
                break;
            }
            let Some(candidate) = self.series.next_raw() else {
                self.done = true;
                break;
            };
            if self.until.is_some_and(|until| candidate > until) || candidate >= self.range_end {
                self.done = true;
                break;
            }
            if let Some(remaining) = self.remaining.as_mut() {
                *remaining -= 1;
            }
            // Counted toward `count`, but entirely before the window.
            if candidate + self.duration <= self.range_start {
                continue;
            }
            return Some(candidate);
        }
        None
    }
}

/// Raw series walker: yields the instants of the recurrence series at or
/// after the series start, in strictly increasing order, with no bounds
/// applied.
enum Series {
    Single {
        start: DateTime<Utc>,
        emitted: bool,
    },
    Daily {
        next: DateTime<Utc>,
        step: Duration,
    },
    Weekly(WeeklySeries),
    Monthly(MonthlySeries),
}

impl Series {
    fn single(start: DateTime<Utc>) -> Self {
        Self::Single {
            start,
            emitted: false,
        }
    }

    fn recurring(start: DateTime<Utc>, rule: &RecurrenceRule) -> Self {
        let interval = i64::from(rule.interval.get());
        match rule.pattern {
            RecurrencePattern::Daily => Self::Daily {
                next: start,
                step: Duration::days(interval),
            },
            RecurrencePattern::Weekly { ref by_day } => {
                Self::Weekly(WeeklySeries::new(start, by_day, interval))
            }
            RecurrencePattern::Monthly => Self::Monthly(MonthlySeries {
                anchor: start,
                months: 0,
                step_months: rule.interval.get(),
            }),
        }
    }

    fn next_raw(&mut self) -> Option<DateTime<Utc>> {
        match self {
            Self::Single { start, emitted } => {
                if *emitted {
                    None
                } else {
                    *emitted = true;
                    Some(*start)
                }
            }
            Self::Daily { next, step } => {
                let current = *next;
                *next = current + *step;
                Some(current)
            }
            Self::Weekly(series) => Some(series.advance()),
            Self::Monthly(series) => Some(series.advance()),
        }
    }
}

/// Week-grid walker: the by-day members of every `interval`-th week, anchored
/// on the Monday of the series start's UTC week.
struct WeeklySeries {
    /// Series start; anchor-week members before this instant are not part of
    /// the series.
    floor: DateTime<Utc>,
    /// Monday of the week currently being enumerated.
    week_start: NaiveDate,
    /// UTC time-of-day shared by every candidate.
    time: NaiveTime,
    /// Sorted offsets from Monday (0-6).
    offsets: Vec<u8>,
    /// Position within `offsets`.
    idx: usize,
    /// Whole weeks between enumerated weeks.
    step_weeks: i64,
}

impl WeeklySeries {
    fn new(start: DateTime<Utc>, by_day: &BTreeSet<Weekday>, interval: i64) -> Self {
        // Empty by-day defaults to the start's weekday, read in UTC.
        let offsets: Vec<u8> = if by_day.is_empty() {
            vec![utc_weekday(start).days_from_monday()]
        } else {
            by_day
                .iter()
                .copied()
                .map(Weekday::days_from_monday)
                .collect()
        };

        let week_start = start.date_naive()
            - Duration::days(i64::from(start.date_naive().weekday().num_days_from_monday()));

        Self {
            floor: start,
            week_start,
            time: start.time(),
            offsets,
            idx: 0,
            step_weeks: interval,
        }
    }

    fn advance(&mut self) -> DateTime<Utc> {
        loop {
            let date = self.week_start + Duration::days(i64::from(self.offsets[self.idx]));
            let candidate = date.and_time(self.time).and_utc();

            self.idx += 1;
            if self.idx == self.offsets.len() {
                self.idx = 0;
                self.week_start += Duration::weeks(self.step_weeks);
            }

            // Anchor-week members before the series start are not occurrences.
            if candidate >= self.floor {
                return candidate;
            }
        }
    }
}

/// Month-grid walker: the anchor's day-of-month every `step_months` months,
/// clipped to the last valid day of shorter months. Each step re-derives the
/// day from the anchor, so a day-31 series resumes day 31 after February.
struct MonthlySeries {
    anchor: DateTime<Utc>,
    months: u32,
    step_months: u32,
}

impl MonthlySeries {
    fn advance(&mut self) -> DateTime<Utc> {
        let candidate = month_candidate(self.anchor, self.months);
        self.months += self.step_months;
        candidate
    }
}

fn month_candidate(anchor: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    let total = anchor.month0() + months;
    #[expect(
        clippy::cast_possible_wrap,
        reason = "months elapsed is bounded well below i32::MAX by the window"
    )]
    let year = anchor.year() + (total / 12) as i32;
    let month = total % 12 + 1;
    let day = anchor.day().min(days_in_month(year, month));

    NaiveDate::from_ymd_opt(year, month, day)
        .map_or(anchor, |date| date.and_time(anchor.time()).and_utc())
}

/// Returns the number of days in a month.
fn days_in_month(year: i32, month: u32) -> u32 {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next
        .and_then(|date| date.pred_opt())
        .map_or(31, |last| last.day())
}
