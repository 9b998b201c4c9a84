//! Recurring-event expansion engine.
//!
//! Given a stored master event (start/end instants, an optional compact
//! recurrence rule, exception dates) and a query window, this crate produces
//! the concrete occurrences that overlap the window:
//!
//! - `rrule`: recurrence-rule types and the rule-string parser
//! - `expand`: candidate generation, exception filtering, timezone
//!   normalization, and window materialization
//! - `event`: the master-event input record and the occurrence output record
//!
//! The engine is pure and stateless: every entry point is a synchronous
//! function of its inputs. The rendering timezone and all bounds are passed
//! in explicitly; nothing is read from ambient state.

pub mod error;
pub mod event;
pub mod expand;
pub mod rrule;

pub use error::{ExpansionError, ExpansionResult};
pub use event::{MasterEvent, Occurrence};
pub use expand::{ExpansionOptions, expand_event, expand_events};
pub use rrule::{Frequency, RecurrencePattern, RecurrenceRule, Weekday, parse_rule};
