//! Date parsing for command arguments.
//!
//! Accepts the handful of shapes people actually type into the bot:
//! RFC 3339, ISO dates with or without a time, `17 July 2021` and
//! `July 17, 2021`, each optionally followed by a time of day such as `15:00`
//! or `3:30 pm`. Values without an explicit offset are read as wall-clock
//! time in the reference timezone; a missing time means midnight.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::dst::localize;
use crate::error::RangeError;

const ISO_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a free-text date into an instant, interpreting civil values in `tz`.
///
/// # Errors
/// Returns [`RangeError::InvalidDate`] carrying the offending text.
pub fn parse_datetime(input: &str, tz: &Tz) -> Result<DateTime<Utc>, RangeError> {
    let text = input.trim();
    let invalid = || RangeError::InvalidDate(text.to_string());
    if text.is_empty() {
        return Err(invalid());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ISO_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(localize(tz, naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(localize(tz, date.and_time(NaiveTime::MIN)));
    }

    parse_spoken(text)
        .map(|naive| localize(tz, naive))
        .ok_or_else(invalid)
}

/// `17 July 2021 15:00`, `July 17, 2021 3pm`, `3rd aug 2021`.
fn parse_spoken(text: &str) -> Option<NaiveDateTime> {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|w| w.trim_end_matches(',').to_lowercase())
        .filter(|w| !w.is_empty())
        .collect();
    if words.len() < 3 {
        return None;
    }

    let (day, month) = match (month_number(&words[0]), month_number(&words[1])) {
        (Some(month), _) => (day_number(&words[1])?, month),
        (None, Some(month)) => (day_number(&words[0])?, month),
        (None, None) => return None,
    };
    let year: i32 = words[2].parse().ok().filter(|y: &i32| (1000..=9999).contains(y))?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    let time = if words.len() > 3 {
        parse_time_of_day(&words[3..].concat())?
    } else {
        NaiveTime::MIN
    };
    Some(date.and_time(time))
}

fn month_number(word: &str) -> Option<u32> {
    let month = match word {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn day_number(word: &str) -> Option<u32> {
    let digits = word
        .strip_suffix("st")
        .or_else(|| word.strip_suffix("nd"))
        .or_else(|| word.strip_suffix("rd"))
        .or_else(|| word.strip_suffix("th"))
        .unwrap_or(word);
    digits.parse().ok().filter(|d| (1..=31).contains(d))
}

/// `15:00`, `15:00:30`, `3pm`, `3:30pm` (already lowercased, spaces removed).
fn parse_time_of_day(word: &str) -> Option<NaiveTime> {
    let (clock, meridiem) = if let Some(rest) = word.strip_suffix("am") {
        (rest, Some(false))
    } else if let Some(rest) = word.strip_suffix("pm") {
        (rest, Some(true))
    } else {
        (word, None)
    };

    let parts: Vec<u32> = clock
        .split(':')
        .map(|p| p.parse().ok())
        .collect::<Option<Vec<u32>>>()?;
    let (hour, minute, second) = match parts.as_slice() {
        [h] if meridiem.is_some() => (*h, 0, 0),
        [h, m] => (*h, *m, 0),
        [h, m, s] => (*h, *m, *s),
        _ => return None,
    };

    let hour = match meridiem {
        Some(_) if !(1..=12).contains(&hour) => return None,
        Some(true) if hour < 12 => hour + 12,
        Some(false) if hour == 12 => 0,
        _ => hour,
    };
    NaiveTime::from_hms_opt(hour, minute, second)
}
