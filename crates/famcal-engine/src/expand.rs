//! Recurrence expansion for stored events.
//!
//! Composition order for one master event against one query window:
//! candidate generation → exception filtering → occurrence emission, with
//! timezone normalization guarding the stored-weekday invariant on the way
//! in and providing local weekdays on the way out.

mod exceptions;
mod generate;
mod materialize;
mod timezone;

pub use exceptions::ExceptionDates;
pub use generate::CandidateStarts;
pub use materialize::{ExpansionOptions, expand_event, expand_events};
pub use timezone::{
    denormalize_recurrence, local_to_utc, local_to_utc_lenient, local_weekday,
    normalize_recurrence, resolve_tz, verify_weekday_consistency,
};
