//! Per-day free time from an ordered list of busy intervals.
//!
//! This module is the core of the engine. Given contiguous day buckets and a
//! schedule sorted by start, it makes one linear pass: each busy interval is
//! assigned to the bucket that holds its start, and a running "covered until"
//! watermark turns the gaps between intervals into free intervals. The
//! watermark carries from one day to the next, so an event that runs past
//! midnight keeps the following morning busy until it actually ends.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bucket::{day_buckets, DayBucket};
use crate::error::DataIntegrityError;
use crate::range::TimeRange;

/// An occupied period reported by the calendar. Zero length is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    /// Start of the busy period.
    pub start: DateTime<Utc>,
    /// End of the busy period (exclusive).
    pub end: DateTime<Utc>,
}

/// A maximal gap inside one day bucket. Always `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeInterval {
    /// Start of the free slot.
    pub start: DateTime<Utc>,
    /// End of the free slot (exclusive).
    pub end: DateTime<Utc>,
}

impl FreeInterval {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Busy intervals in ascending start order plus the timezone that defines days.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    /// Timezone whose local midnights split the range into days.
    pub timezone: Tz,
    /// Busy intervals, ascending by start. May overlap.
    pub intervals: Vec<BusyInterval>,
}

/// The free intervals of one day bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAvailability {
    /// The day these slots belong to.
    pub bucket: DayBucket,
    /// Free slots in ascending order, all within `bucket`.
    pub free: Vec<FreeInterval>,
}

impl DayAvailability {
    /// No busy time touched this day.
    pub fn is_completely_free(&self) -> bool {
        matches!(
            self.free.as_slice(),
            [only] if only.start == self.bucket.day_start && only.end == self.bucket.day_end
        )
    }
}

/// Everything a report needs: no day boundary has to be derived again.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Availability {
    /// Timezone the days were computed in.
    pub timezone: Tz,
    /// The requested range.
    pub range: TimeRange,
    /// One entry per civil day overlapping `range`, in order.
    pub days: Vec<DayAvailability>,
}

/// Bucket `range` by civil day in the schedule's timezone and compute free time.
///
/// # Errors
/// Any [`DataIntegrityError`] from [`compute_availability`]; nothing partial
/// is returned.
pub fn partition(range: &TimeRange, schedule: &Schedule) -> Result<Availability, DataIntegrityError> {
    let buckets = day_buckets(range, &schedule.timezone);
    debug!(
        timezone = %schedule.timezone,
        buckets = buckets.len(),
        intervals = schedule.intervals.len(),
        "partitioning availability"
    );
    let days = compute_availability(&buckets, &schedule.intervals)?;
    Ok(Availability {
        timezone: schedule.timezone,
        range: *range,
        days,
    })
}

/// Compute free intervals for each bucket.
///
/// `buckets` must be contiguous and ascending; `intervals` must be ascending
/// by start (ties keep their order). Intervals that start before the first
/// bucket belong to the first bucket, and the last bucket takes everything
/// left over.
///
/// # Errors
/// - [`DataIntegrityError::MalformedInterval`] if an interval ends before it starts.
/// - [`DataIntegrityError::UnorderedSchedule`] if starts are not ascending.
/// - [`DataIntegrityError::DiscontiguousBuckets`] if buckets leave a gap or overlap.
pub fn compute_availability(
    buckets: &[DayBucket],
    intervals: &[BusyInterval],
) -> Result<Vec<DayAvailability>, DataIntegrityError> {
    validate_schedule(intervals)?;
    validate_buckets(buckets)?;

    let mut days = Vec::with_capacity(buckets.len());
    let mut cursor = 0;
    let mut carried: Option<DateTime<Utc>> = None;

    for (i, bucket) in buckets.iter().enumerate() {
        let assigned_until = match buckets.get(i + 1) {
            Some(next) => intervals[cursor..]
                .iter()
                .position(|iv| iv.start >= next.day_start)
                .map_or(intervals.len(), |offset| cursor + offset),
            None => intervals.len(),
        };

        let mut watermark = carried.map_or(bucket.day_start, |c| c.max(bucket.day_start));
        let mut free = Vec::new();

        for interval in &intervals[cursor..assigned_until] {
            // Zero-length intervals cover nothing and must not split a gap.
            if interval.start == interval.end {
                continue;
            }
            let gap_end = interval.start.min(bucket.day_end);
            if watermark < gap_end {
                free.push(FreeInterval {
                    start: watermark,
                    end: gap_end,
                });
            }
            watermark = watermark.max(interval.end);
        }
        if watermark < bucket.day_end {
            free.push(FreeInterval {
                start: watermark,
                end: bucket.day_end,
            });
        }

        carried = Some(watermark);
        cursor = assigned_until;
        days.push(DayAvailability {
            bucket: *bucket,
            free,
        });
    }

    Ok(days)
}

fn validate_schedule(intervals: &[BusyInterval]) -> Result<(), DataIntegrityError> {
    for (index, interval) in intervals.iter().enumerate() {
        if interval.end < interval.start {
            return Err(DataIntegrityError::MalformedInterval { index });
        }
        if index > 0 && interval.start < intervals[index - 1].start {
            return Err(DataIntegrityError::UnorderedSchedule { index });
        }
    }
    Ok(())
}

fn validate_buckets(buckets: &[DayBucket]) -> Result<(), DataIntegrityError> {
    for (index, bucket) in buckets.iter().enumerate() {
        let broken = bucket.day_start >= bucket.day_end
            || (index > 0 && buckets[index - 1].day_end != bucket.day_start);
        if broken {
            return Err(DataIntegrityError::DiscontiguousBuckets { index });
        }
    }
    Ok(())
}
