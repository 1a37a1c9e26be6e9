//! Command arguments → a single validated [`TimeRange`].
//!
//! The `freetime` command accepts three argument shapes. They are classified
//! once into a [`RangeRequest`] and resolved by one function, so every caller
//! sees the same validation rules and error messages.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::dates::parse_datetime;
use crate::dst::add_civil_days;
use crate::error::RangeError;

pub const RELATIVE_KEYWORD: &str = "in";
pub const START_MARKER: &str = "start:";
pub const END_MARKER: &str = "end:";

/// A non-empty half-open span of time, `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    /// # Errors
    /// [`RangeError::EmptyRange`] when `start == end`,
    /// [`RangeError::InvertedRange`] when `start > end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, RangeError> {
        if start == end {
            Err(RangeError::EmptyRange)
        } else if start > end {
            Err(RangeError::InvertedRange)
        } else {
            Ok(Self { start, end })
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// The three argument shapes of the `freetime` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeRequest {
    /// `in <N>`: the next N calendar days starting now.
    RelativeDays { count: String },
    /// `start: <date> end: <date>`, markers in either order.
    Explicit { start: String, end: String },
    /// `<date>`: that whole day.
    SingleDate { date: String },
}

impl RangeRequest {
    /// Classify whitespace-split argument tokens (command word excluded).
    ///
    /// # Errors
    /// [`RangeError::MissingMarker`] when only one of `start:`/`end:` is present.
    pub fn classify<S: AsRef<str>>(tokens: &[S]) -> Result<Self, RangeError> {
        let tokens: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();

        if tokens.first() == Some(&RELATIVE_KEYWORD) {
            let count = tokens.get(1).copied().unwrap_or_default().to_string();
            return Ok(Self::RelativeDays { count });
        }

        let start_at = tokens.iter().position(|t| *t == START_MARKER);
        let end_at = tokens.iter().position(|t| *t == END_MARKER);
        match (start_at, end_at) {
            (None, None) => Ok(Self::SingleDate {
                date: tokens.join(" "),
            }),
            (Some(s), Some(e)) => {
                let (start, end) = if s < e {
                    (&tokens[s + 1..e], &tokens[e + 1..])
                } else {
                    (&tokens[s + 1..], &tokens[e + 1..s])
                };
                Ok(Self::Explicit {
                    start: start.join(" "),
                    end: end.join(" "),
                })
            }
            _ => Err(RangeError::MissingMarker),
        }
    }

    /// Resolve to a concrete range. Civil dates are read in `tz`.
    pub fn resolve(&self, now: DateTime<Utc>, tz: &Tz) -> Result<TimeRange, RangeError> {
        match self {
            Self::RelativeDays { count } => {
                let days = parse_day_count(count)?;
                let end = add_civil_days(tz, now, days)
                    .ok_or_else(|| RangeError::InvalidDate(format!("{days} days from now")))?;
                TimeRange::new(now, end)
            }
            Self::Explicit { start, end } => {
                let start = parse_datetime(start, tz)?;
                let end = parse_datetime(end, tz)?;
                if start > end {
                    TimeRange::new(end, start)
                } else {
                    TimeRange::new(start, end)
                }
            }
            Self::SingleDate { date } => {
                let start = parse_datetime(date, tz)?;
                let end = add_civil_days(tz, start, 1)
                    .ok_or_else(|| RangeError::InvalidDate(date.clone()))?;
                TimeRange::new(start, end)
            }
        }
    }
}

/// Classify and resolve in one step.
pub fn resolve_range<S: AsRef<str>>(
    tokens: &[S],
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<TimeRange, RangeError> {
    RangeRequest::classify(tokens)?.resolve(now, tz)
}

fn parse_day_count(raw: &str) -> Result<u64, RangeError> {
    let value: f64 = raw
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| RangeError::CountNotANumber(raw.to_string()))?;
    if value.fract() != 0.0 {
        return Err(RangeError::CountNotAnInteger(raw.to_string()));
    }
    // Integral and finite; values past i64 saturate and fail the calendar
    // overflow check later.
    let whole = value as i64;
    if whole < 1 {
        return Err(RangeError::CountNotPositive(whole));
    }
    Ok(whole as u64)
}
