//! Parser for the compact recurrence-rule string grammar.
//!
//! Grammar (a restricted subset of RFC 5545 RRULE syntax):
//!
//! ```text
//! FREQ=<DAILY|WEEKLY|MONTHLY>[;INTERVAL=<positive int>]
//!     [;BYDAY=<comma-separated weekday symbols>]
//!     [;UNTIL=<UTC instant>][;COUNT=<positive int>]
//! ```
//!
//! Rule parts RFC 5545 defines but this engine does not evaluate are rejected
//! with a distinct unsupported-feature error so callers can report "not
//! supported" rather than "invalid".

use std::collections::BTreeSet;
use std::num::NonZeroU32;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{ExpansionError, ExpansionResult};
use crate::rrule::{Frequency, RecurrencePattern, RecurrenceRule, Weekday};

/// FREQ values RFC 5545 defines but this engine does not evaluate.
const UNSUPPORTED_FREQS: [&str; 4] = ["SECONDLY", "MINUTELY", "HOURLY", "YEARLY"];

/// Rule parts RFC 5545 defines but this engine does not evaluate.
const UNSUPPORTED_PARTS: [&str; 9] = [
    "BYSECOND",
    "BYMINUTE",
    "BYHOUR",
    "BYMONTHDAY",
    "BYYEARDAY",
    "BYWEEKNO",
    "BYMONTH",
    "BYSETPOS",
    "WKST",
];

/// ## Summary
/// Parses a compact recurrence-rule string into a [`RecurrenceRule`].
///
/// Pure function of the input; a leading `RRULE:` prefix is tolerated.
///
/// ## Errors
///
/// Returns `MalformedRule` when the string is syntactically invalid (missing
/// or unknown `FREQ`, non-positive `INTERVAL` or `COUNT`, unparsable `UNTIL`,
/// unknown `BYDAY` token, `BYDAY` on a daily rule, duplicated parts) and
/// `UnsupportedRule` when the string is valid RFC 5545 but uses a feature
/// outside the supported subset.
pub fn parse_rule(input: &str) -> ExpansionResult<RecurrenceRule> {
    let input = input.strip_prefix("RRULE:").unwrap_or(input).trim();
    if input.is_empty() {
        return Err(ExpansionError::MalformedRule(
            "empty rule string".to_string(),
        ));
    }

    let mut freq = None;
    let mut interval = None;
    let mut by_day: Option<BTreeSet<Weekday>> = None;
    let mut until = None;
    let mut count = None;

    for part in input.split(';') {
        let Some((key, value)) = part.split_once('=') else {
            return Err(ExpansionError::MalformedRule(format!(
                "rule part without '=': {part}"
            )));
        };
        let key = key.trim().to_ascii_uppercase();

        match key.as_str() {
            "FREQ" => {
                check_unseen("FREQ", freq.is_none())?;
                freq = Some(parse_freq(value)?);
            }
            "INTERVAL" => {
                check_unseen("INTERVAL", interval.is_none())?;
                interval = Some(parse_positive_int("INTERVAL", value)?);
            }
            "BYDAY" => {
                check_unseen("BYDAY", by_day.is_none())?;
                by_day = Some(parse_by_day(value)?);
            }
            "UNTIL" => {
                check_unseen("UNTIL", until.is_none())?;
                until = Some(parse_instant(value)?);
            }
            "COUNT" => {
                check_unseen("COUNT", count.is_none())?;
                count = Some(parse_positive_int("COUNT", value)?);
            }
            _ if UNSUPPORTED_PARTS.contains(&key.as_str()) => {
                return Err(ExpansionError::UnsupportedRule(format!(
                    "rule part {key} is not supported"
                )));
            }
            _ => {
                return Err(ExpansionError::MalformedRule(format!(
                    "unknown rule part: {key}"
                )));
            }
        }
    }

    let Some(freq) = freq else {
        return Err(ExpansionError::MalformedRule("missing FREQ".to_string()));
    };

    let pattern = match (freq, by_day) {
        (Frequency::Daily, None) => RecurrencePattern::Daily,
        (Frequency::Daily, Some(_)) => {
            return Err(ExpansionError::MalformedRule(
                "BYDAY is not applicable to FREQ=DAILY".to_string(),
            ));
        }
        (Frequency::Weekly, by_day) => RecurrencePattern::Weekly {
            by_day: by_day.unwrap_or_default(),
        },
        (Frequency::Monthly, None) => RecurrencePattern::Monthly,
        (Frequency::Monthly, Some(_)) => {
            return Err(ExpansionError::UnsupportedRule(
                "BYDAY with FREQ=MONTHLY is not supported".to_string(),
            ));
        }
    };

    Ok(RecurrenceRule {
        pattern,
        interval: interval.unwrap_or(NonZeroU32::MIN),
        until,
        count,
    })
}

fn check_unseen(key: &str, unseen: bool) -> ExpansionResult<()> {
    if unseen {
        Ok(())
    } else {
        Err(ExpansionError::MalformedRule(format!(
            "duplicate rule part: {key}"
        )))
    }
}

fn parse_freq(value: &str) -> ExpansionResult<Frequency> {
    let upper = value.trim().to_ascii_uppercase();
    Frequency::parse(&upper).map_or_else(
        || {
            if UNSUPPORTED_FREQS.contains(&upper.as_str()) {
                Err(ExpansionError::UnsupportedRule(format!(
                    "FREQ={upper} is not supported"
                )))
            } else {
                Err(ExpansionError::MalformedRule(format!(
                    "unknown FREQ value: {value}"
                )))
            }
        },
        Ok,
    )
}

fn parse_positive_int(key: &str, value: &str) -> ExpansionResult<NonZeroU32> {
    value
        .trim()
        .parse::<NonZeroU32>()
        .map_err(|_e| {
            ExpansionError::MalformedRule(format!("{key} must be a positive integer, got {value}"))
        })
}

fn parse_by_day(value: &str) -> ExpansionResult<BTreeSet<Weekday>> {
    if value.trim().is_empty() {
        return Err(ExpansionError::MalformedRule(
            "empty BYDAY list".to_string(),
        ));
    }

    let mut days = BTreeSet::new();
    for token in value.split(',') {
        let token = token.trim();
        // Ordinal prefixes (1MO, -1FR) select the nth weekday of a period,
        // which this engine does not evaluate.
        if token.len() > 2 {
            return Err(ExpansionError::UnsupportedRule(format!(
                "ordinal BYDAY entry {token} is not supported"
            )));
        }
        let Some(day) = Weekday::parse(token) else {
            return Err(ExpansionError::MalformedRule(format!(
                "unknown BYDAY token: {token}"
            )));
        };
        days.insert(day);
    }
    Ok(days)
}

/// Parses a UTC instant from RFC 3339 (`2025-12-20T00:00:00Z`), iCal basic
/// (`20251220T000000Z`), or a bare date (midnight UTC).
fn parse_instant(value: &str) -> ExpansionResult<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%SZ") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }

    Err(ExpansionError::MalformedRule(format!(
        "UNTIL is not a valid instant: {value}"
    )))
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
