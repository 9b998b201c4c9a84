//! Timezone resolution and recurrence-weekday normalization.
//!
//! Stored events carry UTC instants, and a weekly rule's by-day set is
//! stored in UTC terms. When a user schedules "every Tuesday 4:30pm" in a
//! zone west of UTC, the stored instant can land on UTC Wednesday; the
//! by-day set must cross the same date boundary, or the event renders on the
//! wrong weekday. The normalizer owns that displacement in both directions,
//! so the fix is an engine invariant rather than something each call site
//! remembers to apply.

use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{ExpansionError, ExpansionResult};
use crate::rrule::{RecurrencePattern, RecurrenceRule, Weekday, utc_weekday};

/// ## Summary
/// Resolves a timezone identifier to a `chrono_tz::Tz`.
///
/// Common non-IANA identifiers (Outlook's Windows display names,
/// mozilla-style prefixes) are mapped to their IANA equivalents first.
///
/// ## Errors
/// Returns `UnknownTimezone` if the identifier cannot be resolved.
pub fn resolve_tz(tzid: &str) -> ExpansionResult<Tz> {
    let normalized = normalize_tzid(tzid);
    Tz::from_str(&normalized).map_err(|_e| ExpansionError::UnknownTimezone(tzid.to_string()))
}

/// Normalizes common calendar-client timezone identifiers to IANA names.
fn normalize_tzid(tzid: &str) -> String {
    let stripped = tzid
        .strip_prefix("/mozilla.org/")
        .or_else(|| tzid.strip_prefix("/softwarestudio.org/"))
        .unwrap_or(tzid);

    // Windows display names show up in Outlook exports.
    match stripped {
        "Eastern Standard Time" => "America/New_York",
        "Central Standard Time" => "America/Chicago",
        "Mountain Standard Time" => "America/Denver",
        "Pacific Standard Time" => "America/Los_Angeles",
        other => other,
    }
    .to_string()
}

/// ## Summary
/// Converts a local wall-clock time to UTC in the given zone.
///
/// An ambiguous time during a DST fold resolves to the first occurrence
/// (RFC 5545 §3.3.5).
///
/// ## Errors
/// Returns `NonExistentLocalTime` for times inside a DST gap.
pub fn local_to_utc(local: NaiveDateTime, tz: Tz) -> ExpansionResult<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::None => Err(ExpansionError::NonExistentLocalTime(format!(
            "{local} in timezone {tz}"
        ))),
        LocalResult::Single(instant) => Ok(instant.with_timezone(&Utc)),
        LocalResult::Ambiguous(first, _second) => Ok(first.with_timezone(&Utc)),
    }
}

/// ## Summary
/// Converts a local wall-clock time to UTC, shifting DST-gap times forward
/// by one hour instead of failing. Intended for import paths where refusing
/// a whole file over one nonexistent time is worse than nudging it.
///
/// ## Errors
/// Returns an error if the shifted time still cannot be converted.
pub fn local_to_utc_lenient(local: NaiveDateTime, tz: Tz) -> ExpansionResult<DateTime<Utc>> {
    match local_to_utc(local, tz) {
        Err(ExpansionError::NonExistentLocalTime(_)) => local_to_utc(local + Duration::hours(1), tz),
        result => result,
    }
}

/// ## Summary
/// Converts a desired local start plus a locally-expressed rule into the
/// stored representation: a UTC instant and a rule whose weekly by-day set
/// is expressed in UTC terms.
///
/// If the conversion crosses a date boundary (local Tuesday 4:30pm in a
/// UTC−8 zone becomes UTC Wednesday 00:30), every by-day member is shifted
/// by the same whole-day displacement, keeping `weekdayOf(start_utc, UTC)`
/// consistent with a by-day set derived from the start.
///
/// ## Errors
/// Returns conversion errors from [`local_to_utc`], and
/// `InvariantViolation` if the displacement is outside one day — a shift the
/// normalizer cannot attribute to a date-boundary crossing.
pub fn normalize_recurrence(
    local_start: NaiveDateTime,
    tz: Tz,
    rule: &RecurrenceRule,
) -> ExpansionResult<(DateTime<Utc>, RecurrenceRule)> {
    let start_utc = local_to_utc(local_start, tz)?;
    let shift = (start_utc.date_naive() - local_start.date()).num_days();
    Ok((start_utc, shift_rule(rule, shift)?))
}

/// ## Summary
/// Re-expresses a stored UTC rule in local terms for presentation, shifting
/// the weekly by-day set back across the date boundary the stored start
/// crossed. The local weekday itself always comes from converting the
/// instant — see [`local_weekday`] — never from reading the stored by-day
/// unconverted.
///
/// ## Errors
/// Returns `InvariantViolation` if the displacement is outside one day.
pub fn denormalize_recurrence(
    start_utc: DateTime<Utc>,
    tz: Tz,
    rule: &RecurrenceRule,
) -> ExpansionResult<RecurrenceRule> {
    let local = start_utc.with_timezone(&tz);
    let shift = (local.date_naive() - start_utc.date_naive()).num_days();
    shift_rule(rule, shift)
}

/// Returns the weekday of a stored instant as seen in the given zone.
#[must_use]
pub fn local_weekday(start_utc: DateTime<Utc>, tz: Tz) -> Weekday {
    Weekday::from(start_utc.with_timezone(&tz).weekday())
}

/// Applies a uniform whole-day shift to a rule's weekly by-day set.
///
/// A uniform shift is only unambiguous within ±1 day; anything larger is
/// refused rather than silently mis-shifted.
fn shift_rule(rule: &RecurrenceRule, shift: i64) -> ExpansionResult<RecurrenceRule> {
    if !(-1..=1).contains(&shift) {
        return Err(ExpansionError::InvariantViolation(format!(
            "conversion crossed {shift} days; recurrence weekdays cannot be shifted"
        )));
    }

    let mut shifted = rule.clone();
    if let RecurrencePattern::Weekly { ref mut by_day } = shifted.pattern {
        *by_day = by_day.iter().map(|day| day.shifted(shift)).collect();
    }
    Ok(shifted)
}

/// ## Summary
/// Checks the stored-weekday invariant before expansion: a weekly rule with
/// a single by-day entry must name the weekday of the stored UTC start.
///
/// A mismatch is the documented wrong-weekday defect in stored data. It is
/// reported, never silently corrected; callers repair the record with
/// [`RecurrenceRule::rederived_for`].
///
/// ## Errors
/// Returns `InvariantViolation` on a mismatch.
pub fn verify_weekday_consistency(
    start_utc: DateTime<Utc>,
    rule: &RecurrenceRule,
) -> ExpansionResult<()> {
    if let RecurrencePattern::Weekly { ref by_day } = rule.pattern
        && let Some(&stored) = by_day.first()
        && by_day.len() == 1
    {
        let derived = utc_weekday(start_utc);
        if stored != derived {
            return Err(ExpansionError::InvariantViolation(format!(
                "rule recurs on {stored} but the stored start falls on {derived} in UTC; \
                 re-derive the rule from the start instant"
            )));
        }
    }
    Ok(())
}
