//! Split a [`TimeRange`] into civil-day buckets in a timezone.
//!
//! Boundaries are derived from local midnight of each civil date and
//! converted to UTC independently, so DST days come out as 23 or 25 hours
//! long instead of drifting by an hour.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::{civil_date, local_midnight};
use crate::range::TimeRange;

/// One civil day: `[day_start, day_end)`, where `day_end` is the next local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
    /// Calendar date of this day in the bucketing timezone.
    pub date: NaiveDate,
    /// Local midnight starting the day (inclusive).
    pub day_start: DateTime<Utc>,
    /// Local midnight starting the next day (exclusive).
    pub day_end: DateTime<Utc>,
}

impl DayBucket {
    /// The bucket for `date` in `tz`.
    pub fn for_date(tz: &Tz, date: NaiveDate) -> Option<Self> {
        let next = date.succ_opt()?;
        Some(Self {
            date,
            day_start: local_midnight(tz, date),
            day_end: local_midnight(tz, next),
        })
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.day_start <= instant && instant < self.day_end
    }
}

/// Every civil day in `tz` that overlaps `range`, in order.
///
/// The first bucket is the day holding `range.start()`. A range that ends
/// exactly on a midnight does not get an empty trailing day; one that ends
/// mid-day always includes that final partial day.
pub fn day_buckets(range: &TimeRange, tz: &Tz) -> Vec<DayBucket> {
    let mut buckets = Vec::new();
    let mut date = civil_date(tz, range.start());

    while let Some(bucket) = DayBucket::for_date(tz, date) {
        if bucket.day_start >= range.end() {
            break;
        }
        buckets.push(bucket);
        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    buckets
}
