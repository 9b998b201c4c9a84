//! Exception-date filtering.
//!
//! An exception date suppresses the whole occurrence falling on that
//! calendar date. Matching is against the occurrence start's local date in
//! the rendering timezone — comparing against the UTC date instead is the
//! same defect class as presenting the stored UTC weekday unconverted.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::{ExpansionError, ExpansionResult};

/// Parsed set of exception dates for one master event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionDates {
    dates: BTreeSet<NaiveDate>,
}

impl ExceptionDates {
    /// ## Summary
    /// Parses a list of ISO calendar dates (`YYYY-MM-DD`).
    ///
    /// ## Errors
    /// Returns `InvalidExceptionDate` on the first entry that is not a
    /// well-formed calendar date.
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> ExpansionResult<Self> {
        let mut dates = BTreeSet::new();
        for entry in entries {
            let entry = entry.as_ref();
            let date = NaiveDate::parse_from_str(entry.trim(), "%Y-%m-%d")
                .map_err(|_e| ExpansionError::InvalidExceptionDate(entry.to_string()))?;
            dates.insert(date);
        }
        Ok(Self { dates })
    }

    /// Whether a candidate start instant falls on an excluded local date.
    #[must_use]
    pub fn excludes(&self, start_utc: DateTime<Utc>, rendering_tz: Tz) -> bool {
        if self.dates.is_empty() {
            return false;
        }
        self.dates
            .contains(&start_utc.with_timezone(&rendering_tz).date_naive())
    }

    /// Number of exception dates in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
