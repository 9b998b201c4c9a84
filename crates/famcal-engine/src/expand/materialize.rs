//! Window materialization: one master event into concrete occurrences.
//!
//! Composes rule parsing, candidate generation, exception filtering, and
//! the weekday-consistency check for one master event against one query
//! window. Expansion is all-or-nothing per master: any failure yields an
//! error and no partial output.

use chrono::{DateTime, Utc};
use famcal_core::config::Settings;
use famcal_core::constants::{DEFAULT_MAX_INSTANCES, DEFAULT_RENDERING_TZ};

use crate::error::{ExpansionError, ExpansionResult};
use crate::event::{MasterEvent, Occurrence};
use crate::expand::exceptions::ExceptionDates;
use crate::expand::generate::CandidateStarts;
use crate::expand::timezone::{resolve_tz, verify_weekday_consistency};
use crate::rrule::parse_rule;

/// Options for one expansion request.
///
/// The rendering timezone and every bound are carried here explicitly; the
/// engine reads no ambient defaults at call time.
#[derive(Debug, Clone)]
pub struct ExpansionOptions {
    /// Start of the query window (inclusive).
    pub range_start: DateTime<Utc>,

    /// End of the query window (exclusive).
    pub range_end: DateTime<Utc>,

    /// IANA timezone for exception-date matching and local-weekday display.
    pub rendering_tz: String,

    /// Upper bound on emitted occurrences per master event.
    pub max_instances: usize,
}

impl ExpansionOptions {
    /// Creates options for a query window with default rendering timezone
    /// and instance cap.
    #[must_use]
    pub fn new(range_start: DateTime<Utc>, range_end: DateTime<Utc>) -> Self {
        Self {
            range_start,
            range_end,
            rendering_tz: DEFAULT_RENDERING_TZ.to_string(),
            max_instances: DEFAULT_MAX_INSTANCES,
        }
    }

    /// Creates options for a query window from loaded settings.
    #[must_use]
    pub fn from_settings(
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
        settings: &Settings,
    ) -> Self {
        Self {
            range_start,
            range_end,
            rendering_tz: settings.calendar.rendering_timezone.clone(),
            max_instances: settings.calendar.max_instances,
        }
    }

    /// Sets the rendering timezone.
    #[must_use]
    pub fn with_rendering_tz(mut self, tz: impl Into<String>) -> Self {
        self.rendering_tz = tz.into();
        self
    }

    /// Sets the maximum number of instances.
    #[must_use]
    pub fn with_max_instances(mut self, max: usize) -> Self {
        self.max_instances = max;
        self
    }
}

/// ## Summary
/// Expands one master event into the occurrences overlapping the query
/// window.
///
/// An occurrence is emitted when `[start, start + duration)` overlaps
/// `[range_start, range_end)` — an occurrence extending past the window end
/// is emitted in full, never clipped. Output is strictly ordered by start
/// instant, and the same inputs always yield the same output.
///
/// ## Errors
///
/// Returns rule parse failures, exception-date failures, timezone
/// resolution failures, `InvariantViolation` for an inverted event interval
/// or a stored weekday mismatch, and `TooManyOccurrences` if the window
/// would emit more than `max_instances` occurrences.
///
/// ## Side Effects
///
/// None — pure function of its inputs.
pub fn expand_event(
    event: &MasterEvent,
    options: &ExpansionOptions,
) -> ExpansionResult<Vec<Occurrence>> {
    event.validate()?;
    let rendering_tz = resolve_tz(&options.rendering_tz)?;

    let rule = event.rrule.as_deref().map(parse_rule).transpose()?;
    if let Some(ref rule) = rule {
        verify_weekday_consistency(event.start_utc, rule)?;
    }

    let exceptions = ExceptionDates::parse(&event.exdates)?;
    let duration = event.duration();
    let is_recurring = rule.is_some();

    let candidates = CandidateStarts::new(
        event.start_utc,
        duration,
        rule.as_ref(),
        options.range_start,
        options.range_end,
    );

    let mut occurrences = Vec::new();
    for start in candidates {
        if exceptions.excludes(start, rendering_tz) {
            tracing::trace!(event_id = %event.id, start = %start, "Occurrence excluded by exception date");
            continue;
        }
        if occurrences.len() == options.max_instances {
            return Err(ExpansionError::TooManyOccurrences(options.max_instances));
        }
        occurrences.push(Occurrence {
            master_id: event.id,
            title: event.title.clone(),
            location: event.location.clone(),
            start_utc: start,
            end_utc: start + duration,
            member_ids: event.member_ids.clone(),
            category: event.category.clone(),
            source: event.source,
            is_recurring,
            original_start: event.start_utc,
        });
    }

    tracing::debug!(
        event_id = %event.id,
        count = occurrences.len(),
        "Expanded event into window"
    );
    Ok(occurrences)
}

/// ## Summary
/// Expands several master events against one window and merges the results,
/// sorted by instance start (ties broken by master id for determinism).
///
/// ## Errors
/// Fails on the first event whose expansion fails; no partial results.
pub fn expand_events(
    events: &[MasterEvent],
    options: &ExpansionOptions,
) -> ExpansionResult<Vec<Occurrence>> {
    let mut all = Vec::new();
    for event in events {
        all.extend(expand_event(event, options)?);
    }
    all.sort_by_key(|occurrence| (occurrence.start_utc, occurrence.master_id));
    Ok(all)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use famcal_core::types::EventSource;
    use uuid::Uuid;

    use super::*;

    fn master(rrule: Option<&str>, exdates: &[&str]) -> MasterEvent {
        MasterEvent {
            id: Uuid::new_v4(),
            title: "Piano lesson".to_string(),
            location: None,
            start_utc: Utc.with_ymd_and_hms(2025, 9, 2, 8, 0, 0).unwrap(),
            end_utc: Utc.with_ymd_and_hms(2025, 9, 2, 9, 0, 0).unwrap(),
            rrule: rrule.map(str::to_string),
            exdates: exdates.iter().map(ToString::to_string).collect(),
            member_ids: vec![Uuid::new_v4()],
            category: "after-school".to_string(),
            source: EventSource::Manual,
        }
    }

    fn september() -> ExpansionOptions {
        ExpansionOptions::new(
            Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn descriptive_fields_are_copied_verbatim() {
        let event = master(Some("FREQ=WEEKLY;BYDAY=TU;COUNT=2"), &[]);
        let occurrences = expand_event(&event, &september()).unwrap();

        assert_eq!(occurrences.len(), 2);
        for occurrence in &occurrences {
            assert_eq!(occurrence.master_id, event.id);
            assert_eq!(occurrence.title, event.title);
            assert_eq!(occurrence.member_ids, event.member_ids);
            assert_eq!(occurrence.category, event.category);
            assert_eq!(occurrence.source, event.source);
            assert_eq!(occurrence.original_start, event.start_utc);
            assert!(occurrence.is_recurring);
            assert_eq!(occurrence.end_utc - occurrence.start_utc, event.duration());
        }
    }

    #[test]
    fn non_recurring_event_inside_window() {
        let event = master(None, &[]);
        let occurrences = expand_event(&event, &september()).unwrap();

        assert_eq!(occurrences.len(), 1);
        assert!(!occurrences[0].is_recurring);
        assert_eq!(occurrences[0].start_utc, event.start_utc);
    }

    #[test]
    fn exception_date_suppresses_occurrence() {
        let event = master(Some("FREQ=WEEKLY;BYDAY=TU"), &["2025-09-09"]);
        let occurrences = expand_event(&event, &september()).unwrap();

        // Tuesdays in September 2025: 2, 9, 16, 23, 30 — minus the 9th.
        assert_eq!(occurrences.len(), 4);
        assert!(
            occurrences
                .iter()
                .all(|o| o.start_utc.date_naive().to_string() != "2025-09-09")
        );
    }

    #[test]
    fn inverted_interval_is_invariant_violation() {
        let mut event = master(None, &[]);
        event.end_utc = event.start_utc - Duration::hours(1);

        assert!(matches!(
            expand_event(&event, &september()),
            Err(ExpansionError::InvariantViolation(_))
        ));
    }

    #[test]
    fn stored_weekday_mismatch_refuses_expansion() {
        // start_utc 2025-09-02 is a Tuesday; a stored BYDAY=WE single-entry
        // rule is the documented wrong-weekday defect.
        let event = master(Some("FREQ=WEEKLY;BYDAY=WE"), &[]);

        assert!(matches!(
            expand_event(&event, &september()),
            Err(ExpansionError::InvariantViolation(_))
        ));
    }

    #[test]
    fn malformed_rule_surfaces_without_partial_output() {
        let event = master(Some("FREQ=SOMETIMES"), &[]);
        assert!(matches!(
            expand_event(&event, &september()),
            Err(ExpansionError::MalformedRule(_))
        ));
    }

    #[test]
    fn unknown_rendering_timezone_is_rejected() {
        let event = master(None, &[]);
        let options = september().with_rendering_tz("Nowhere/Special");

        assert!(matches!(
            expand_event(&event, &options),
            Err(ExpansionError::UnknownTimezone(_))
        ));
    }

    #[test]
    fn instance_cap_is_an_error_not_truncation() {
        let event = master(Some("FREQ=DAILY"), &[]);
        let options = september().with_max_instances(5);

        assert!(matches!(
            expand_event(&event, &options),
            Err(ExpansionError::TooManyOccurrences(5))
        ));
    }

    #[test]
    fn multiple_events_merge_sorted_by_start() {
        let tuesday = master(Some("FREQ=WEEKLY;BYDAY=TU;COUNT=3"), &[]);
        let mut thursday = master(Some("FREQ=WEEKLY;BYDAY=TH;COUNT=3"), &[]);
        thursday.start_utc = Utc.with_ymd_and_hms(2025, 9, 4, 8, 0, 0).unwrap();
        thursday.end_utc = Utc.with_ymd_and_hms(2025, 9, 4, 9, 0, 0).unwrap();

        let occurrences = expand_events(&[thursday, tuesday], &september()).unwrap();

        assert_eq!(occurrences.len(), 6);
        assert!(
            occurrences
                .windows(2)
                .all(|pair| pair[0].start_utc <= pair[1].start_utc)
        );
    }

    #[test]
    fn expansion_is_deterministic() {
        let event = master(
            Some("FREQ=WEEKLY;BYDAY=TU,TH;UNTIL=2025-12-20T00:00:00Z"),
            &["2025-09-16"],
        );
        let options = september();

        let first = expand_event(&event, &options).unwrap();
        let second = expand_event(&event, &options).unwrap();
        assert_eq!(first, second);
    }
}
