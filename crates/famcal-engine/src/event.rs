//! Master-event input and occurrence output records.

use chrono::{DateTime, Duration, Utc};
use famcal_core::types::EventSource;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ExpansionError, ExpansionResult};

/// A stored, possibly-recurring event definition.
///
/// The engine treats this record as read-only input; persistence belongs to
/// the surrounding application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterEvent {
    pub id: Uuid,

    pub title: String,

    pub location: Option<String>,

    /// Series start. Every occurrence keeps this instant's duration.
    pub start_utc: DateTime<Utc>,

    /// Series end; must be strictly after `start_utc`.
    pub end_utc: DateTime<Utc>,

    /// Compact recurrence-rule string; `None` means a single event.
    pub rrule: Option<String>,

    /// ISO calendar dates (`YYYY-MM-DD`) whose occurrences are suppressed.
    /// Matched against the occurrence's local date in the rendering timezone.
    pub exdates: Vec<String>,

    /// Which family members this event applies to; carried through unchanged
    /// to every occurrence.
    pub member_ids: Vec<Uuid>,

    pub category: String,

    pub source: EventSource,
}

impl MasterEvent {
    /// Returns the invariant duration shared by every occurrence.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end_utc - self.start_utc
    }

    /// ## Summary
    /// Checks the structural invariants expansion relies on.
    ///
    /// ## Errors
    /// Returns `InvariantViolation` if `end_utc` is not after `start_utc`.
    pub fn validate(&self) -> ExpansionResult<()> {
        if self.end_utc <= self.start_utc {
            return Err(ExpansionError::InvariantViolation(format!(
                "event {} ends at or before its start ({} <= {})",
                self.id, self.end_utc, self.start_utc
            )));
        }
        Ok(())
    }
}

/// One concrete instantiation of a master event.
///
/// Created fresh on every expansion call; owned solely by the caller that
/// requested the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Back-reference to the master definition (lookup only).
    pub master_id: Uuid,

    pub title: String,

    pub location: Option<String>,

    /// This instance's concrete start.
    pub start_utc: DateTime<Utc>,

    /// This instance's concrete end; `end_utc - start_utc` equals the
    /// master's duration.
    pub end_utc: DateTime<Utc>,

    pub member_ids: Vec<Uuid>,

    pub category: String,

    pub source: EventSource,

    /// Whether this instance came from a recurrence rule.
    pub is_recurring: bool,

    /// Start of the master definition this instance was derived from.
    pub original_start: DateTime<Utc>,
}
