//! Civil-time to instant conversion across DST transitions.
//!
//! Every place the engine turns a wall-clock value into an instant goes
//! through [`localize`], so gap and overlap handling is decided once:
//!
//! - Ambiguous local times (clocks fall back) take the earlier instant.
//! - Nonexistent local times (clocks spring forward) shift forward by the
//!   length of the gap, i.e. they are read with the offset in force before it.

use chrono::{DateTime, Days, Duration, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

/// Convert a wall-clock value in `tz` to an absolute instant.
pub fn localize(tz: &Tz, local: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => shift_forward(tz, local),
    }
}

/// Place a wall-clock value that falls in a DST gap after the gap, by
/// reading it with the offset in force before the transition.
fn shift_forward(tz: &Tz, local: NaiveDateTime) -> DateTime<Utc> {
    let before = tz
        .offset_from_utc_datetime(&(local - Duration::hours(24)))
        .fix()
        .local_minus_utc();
    Utc.from_utc_datetime(&(local - Duration::seconds(i64::from(before))))
}

/// The instant at which `date` begins in `tz`.
pub fn local_midnight(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    localize(tz, date.and_time(chrono::NaiveTime::MIN))
}

/// The civil date `instant` falls on in `tz`.
pub fn civil_date(tz: &Tz, instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Move `instant` forward by `days` calendar days in `tz`, keeping its
/// wall-clock time. Returns `None` only on calendar overflow.
pub fn add_civil_days(tz: &Tz, instant: DateTime<Utc>, days: u64) -> Option<DateTime<Utc>> {
    let local = instant.with_timezone(tz).naive_local();
    let shifted = local.checked_add_days(Days::new(days))?;
    Some(localize(tz, shifted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::New_York;
    use chrono_tz::America::Santiago;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn ambiguous_time_takes_earlier_instant() {
        // 2024-11-03 01:30 happens twice in New York.
        let local = NaiveDate::from_ymd_opt(2024, 11, 3)
            .unwrap()
            .and_hms_opt(1, 30, 0)
            .unwrap();
        assert_eq!(localize(&New_York, local), utc("2024-11-03T05:30:00Z"));
    }

    #[test]
    fn gap_time_shifts_forward() {
        // 2024-03-10 02:30 does not exist in New York; it reads as 03:30 EDT.
        let local = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        assert_eq!(localize(&New_York, local), utc("2024-03-10T07:30:00Z"));
    }

    #[test]
    fn midnight_gap_resolves_to_first_valid_instant() {
        // Chile springs forward at local midnight: 2024-09-08 00:00 -> 01:00.
        let date = NaiveDate::from_ymd_opt(2024, 9, 8).unwrap();
        let start = local_midnight(&Santiago, date);
        assert_eq!(start, utc("2024-09-08T04:00:00Z"));
        assert_eq!(civil_date(&Santiago, start), date);
    }

    #[test]
    fn civil_days_keep_wall_clock_across_dst() {
        // 09:00 EST on March 9 plus one day is 09:00 EDT on March 10.
        let start = utc("2024-03-09T14:00:00Z");
        let next = add_civil_days(&New_York, start, 1).unwrap();
        assert_eq!(next, utc("2024-03-10T13:00:00Z"));
        assert_eq!(next - start, Duration::hours(23));
    }
}
