//! Error types for freetime-engine operations.
//!
//! Three categories are kept apart because callers react to them differently:
//! [`RangeError`] is the user's fault and gets a specific reply,
//! [`DataIntegrityError`] means the calendar provider broke its contract, and
//! [`CollaboratorError`] comes straight from the provider boundary.

use thiserror::Error;

/// Rejected command input. The `Display` text is the user-facing reply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("Please make sure you input an integer number of days from now.")]
    CountNotANumber(String),

    #[error("Please make sure you input a whole number of days from now, not {0}.")]
    CountNotAnInteger(String),

    #[error("Please input an integer number of days from now that is greater than 0.")]
    CountNotPositive(i64),

    #[error("Please make sure you indicate both a start and end time. Ex. freetime start: 30 July 2021 end: 8 August 2021")]
    MissingMarker,

    #[error("Could not read \"{0}\" as a date. Please format dates like this: 17 July 2021, with the day, month, and year.")]
    InvalidDate(String),

    #[error("Please make room between the two dates.")]
    EmptyRange,

    #[error("The start date occurs after the end date. Ensure that the start date comes before the end date.")]
    InvertedRange,

    #[error("Please provide -{0} when creating an event.")]
    MissingField(String),

    #[error("The timezone \"{0}\" cannot be interpreted. Use an identifier from https://en.wikipedia.org/wiki/List_of_tz_database_time_zones, e.g. America/New_York.")]
    InvalidTimezone(String),
}

/// The calendar provider handed back data that violates its contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataIntegrityError {
    #[error("busy interval #{index} ends before it starts")]
    MalformedInterval { index: usize },

    #[error("busy interval #{index} starts before its predecessor; schedule must be ascending by start")]
    UnorderedSchedule { index: usize },

    #[error("day bucket #{index} does not begin where the previous one ends")]
    DiscontiguousBuckets { index: usize },

    #[error("unknown timezone in provider response: {0}")]
    UnknownTimezone(String),
}

/// Failures reported by the calendar provider boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("no calendar account is linked")]
    NoLinkedAccount,

    #[error("calendar credential has expired or been revoked")]
    RevokedCredential,

    #[error("calendar provider error: {0}")]
    Provider(String),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    DataIntegrity(#[from] DataIntegrityError),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    #[error("Invalid config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
