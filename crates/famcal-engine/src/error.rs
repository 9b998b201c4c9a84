//! Engine error types.

use thiserror::Error;

/// Error during recurrence expansion.
///
/// All variants are local to a single expansion call. The computation is
/// deterministic, so retrying with the same input yields the same error, and
/// no partial output is ever returned alongside one.
#[derive(Debug, Error)]
pub enum ExpansionError {
    /// The recurrence-rule string is syntactically invalid.
    #[error("Malformed recurrence rule: {0}")]
    MalformedRule(String),

    /// The rule is syntactically valid but uses a recurrence feature outside
    /// the supported subset.
    #[error("Unsupported recurrence feature: {0}")]
    UnsupportedRule(String),

    /// An exception-date entry is not a well-formed calendar date.
    #[error("Invalid exception date: {0}")]
    InvalidExceptionDate(String),

    /// Unknown or invalid timezone identifier.
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Non-existent local time during a DST gap.
    #[error("Non-existent local time (DST gap): {0}")]
    NonExistentLocalTime(String),

    /// Defensive check failure on the master event or its stored rule.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Expansion exceeded the configured instance limit.
    #[error("Expansion exceeded maximum limit of {0} occurrences")]
    TooManyOccurrences(usize),
}

pub type ExpansionResult<T> = std::result::Result<T, ExpansionError>;
