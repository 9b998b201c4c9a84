//! Tests for the recurrence-rule parser.

use chrono::TimeZone;

use super::*;

#[test]
fn parse_weekly_byday_until() {
    let rule = parse_rule("FREQ=WEEKLY;BYDAY=TU,TH;UNTIL=2025-12-20T00:00:00Z").unwrap();

    assert_eq!(
        rule.pattern,
        RecurrencePattern::Weekly {
            by_day: [Weekday::Tuesday, Weekday::Thursday].into_iter().collect()
        }
    );
    assert_eq!(rule.interval.get(), 1);
    assert_eq!(
        rule.until,
        Some(Utc.with_ymd_and_hms(2025, 12, 20, 0, 0, 0).unwrap())
    );
    assert_eq!(rule.count, None);
}

#[test]
fn parse_daily_count() {
    let rule = parse_rule("FREQ=DAILY;COUNT=5").unwrap();
    assert_eq!(rule.pattern, RecurrencePattern::Daily);
    assert_eq!(rule.count.map(NonZeroU32::get), Some(5));
}

#[test]
fn parse_monthly_interval() {
    let rule = parse_rule("FREQ=MONTHLY;INTERVAL=3").unwrap();
    assert_eq!(rule.pattern, RecurrencePattern::Monthly);
    assert_eq!(rule.interval.get(), 3);
}

#[test]
fn parse_tolerates_rrule_prefix_and_case() {
    let rule = parse_rule("RRULE:freq=weekly;byday=mo").unwrap();
    assert_eq!(
        rule.pattern,
        RecurrencePattern::Weekly {
            by_day: [Weekday::Monday].into_iter().collect()
        }
    );
}

#[test]
fn parse_until_ical_basic_format() {
    let rule = parse_rule("FREQ=WEEKLY;BYDAY=SA;UNTIL=20260630T000000Z").unwrap();
    assert_eq!(
        rule.until,
        Some(Utc.with_ymd_and_hms(2026, 6, 30, 0, 0, 0).unwrap())
    );
}

#[test]
fn parse_until_bare_date() {
    let rule = parse_rule("FREQ=DAILY;UNTIL=2025-09-30").unwrap();
    assert_eq!(
        rule.until,
        Some(Utc.with_ymd_and_hms(2025, 9, 30, 0, 0, 0).unwrap())
    );
}

#[test]
fn parse_until_and_count_together() {
    // Both bounds may be present; whichever is reached first wins during
    // generation.
    let rule = parse_rule("FREQ=DAILY;UNTIL=2025-12-31T00:00:00Z;COUNT=10").unwrap();
    assert!(rule.until.is_some());
    assert!(rule.count.is_some());
}

#[test]
fn missing_freq_is_malformed() {
    assert!(matches!(
        parse_rule("BYDAY=TU,TH"),
        Err(ExpansionError::MalformedRule(_))
    ));
    assert!(matches!(
        parse_rule(""),
        Err(ExpansionError::MalformedRule(_))
    ));
}

#[test]
fn unknown_freq_is_malformed() {
    assert!(matches!(
        parse_rule("FREQ=FORTNIGHTLY"),
        Err(ExpansionError::MalformedRule(_))
    ));
}

#[test]
fn unsupported_freq_is_distinct() {
    for freq in ["SECONDLY", "MINUTELY", "HOURLY", "YEARLY"] {
        assert!(matches!(
            parse_rule(&format!("FREQ={freq}")),
            Err(ExpansionError::UnsupportedRule(_))
        ));
    }
}

#[test]
fn non_positive_interval_is_malformed() {
    assert!(matches!(
        parse_rule("FREQ=DAILY;INTERVAL=0"),
        Err(ExpansionError::MalformedRule(_))
    ));
    assert!(matches!(
        parse_rule("FREQ=DAILY;INTERVAL=-2"),
        Err(ExpansionError::MalformedRule(_))
    ));
    assert!(matches!(
        parse_rule("FREQ=DAILY;COUNT=abc"),
        Err(ExpansionError::MalformedRule(_))
    ));
}

#[test]
fn invalid_until_is_malformed() {
    assert!(matches!(
        parse_rule("FREQ=DAILY;UNTIL=someday"),
        Err(ExpansionError::MalformedRule(_))
    ));
}

#[test]
fn unknown_byday_token_is_malformed() {
    assert!(matches!(
        parse_rule("FREQ=WEEKLY;BYDAY=TU,XX"),
        Err(ExpansionError::MalformedRule(_))
    ));
}

#[test]
fn ordinal_byday_is_unsupported() {
    assert!(matches!(
        parse_rule("FREQ=WEEKLY;BYDAY=1MO"),
        Err(ExpansionError::UnsupportedRule(_))
    ));
    assert!(matches!(
        parse_rule("FREQ=WEEKLY;BYDAY=-1FR"),
        Err(ExpansionError::UnsupportedRule(_))
    ));
}

#[test]
fn byday_on_daily_is_malformed() {
    assert!(matches!(
        parse_rule("FREQ=DAILY;BYDAY=MO"),
        Err(ExpansionError::MalformedRule(_))
    ));
}

#[test]
fn byday_on_monthly_is_unsupported() {
    assert!(matches!(
        parse_rule("FREQ=MONTHLY;BYDAY=1FR"),
        Err(ExpansionError::UnsupportedRule(_))
    ));
    assert!(matches!(
        parse_rule("FREQ=MONTHLY;BYDAY=FR"),
        Err(ExpansionError::UnsupportedRule(_))
    ));
}

#[test]
fn unsupported_parts_are_distinct() {
    for part in ["BYSETPOS=1", "BYMONTH=2", "BYMONTHDAY=15", "WKST=SU"] {
        assert!(matches!(
            parse_rule(&format!("FREQ=MONTHLY;{part}")),
            Err(ExpansionError::UnsupportedRule(_))
        ));
    }
}

#[test]
fn duplicate_part_is_malformed() {
    assert!(matches!(
        parse_rule("FREQ=DAILY;FREQ=WEEKLY"),
        Err(ExpansionError::MalformedRule(_))
    ));
}

#[test]
fn parsed_rule_round_trips_through_display() {
    let canonical = "FREQ=WEEKLY;INTERVAL=2;BYDAY=TU,TH;UNTIL=2025-10-01T00:00:00Z";
    let rule = parse_rule(canonical).unwrap();
    assert_eq!(rule.to_string(), canonical);
    assert_eq!(parse_rule(&rule.to_string()).unwrap(), rule);
}
