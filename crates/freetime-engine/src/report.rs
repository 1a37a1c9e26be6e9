//! Plain-text rendering of engine results for chat replies.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::availability::{Availability, DayAvailability};
use crate::calendar::CalendarEvent;

const DATE: &str = "%B %-d, %Y";
const DAY_HEADING: &str = "%A, %B %-d, %Y";
const TIME: &str = "%-I:%M %p";
const DATE_TIME: &str = "%B %-d, %Y %-I:%M %p";

/// Render free time per day, in the schedule's timezone.
pub fn render_availability(availability: &Availability) -> String {
    let tz = &availability.timezone;
    let mut out = format!(
        "Here are your free timeslots from {} - {} ({}):\n",
        local(availability.range.start(), tz, DATE),
        local(availability.range.end(), tz, DATE),
        tz.name(),
    );
    for day in &availability.days {
        render_day(&mut out, day, tz);
    }
    out
}

fn render_day(out: &mut String, day: &DayAvailability, tz: &Tz) {
    let _ = writeln!(out, "\n{}", day.bucket.date.format(DAY_HEADING));
    if day.is_completely_free() {
        out.push_str("This day is completely free!\n");
        return;
    }
    if day.free.is_empty() {
        out.push_str("No free time on this day.\n");
        return;
    }
    for slot in &day.free {
        let end = if slot.end == day.bucket.day_end {
            "midnight".to_string()
        } else {
            local(slot.end, tz, TIME)
        };
        let _ = writeln!(out, "{} - {}", local(slot.start, tz, TIME), end);
    }
}

/// Render upcoming events with times in `tz`.
pub fn render_events(events: &[CalendarEvent], tz: &Tz) -> String {
    if events.is_empty() {
        return "You have no upcoming events.\n".to_string();
    }
    let mut out = String::new();
    for event in events {
        let _ = writeln!(out, "{}", event.summary);
        let _ = writeln!(out, "  Start: {}", local(event.start, tz, DATE_TIME));
        let _ = writeln!(out, "  End: {}", local(event.end, tz, DATE_TIME));
        if let Some(description) = &event.description {
            let _ = writeln!(out, "  {}", description);
        }
    }
    out
}

fn local(instant: DateTime<Utc>, tz: &Tz, format: &str) -> String {
    instant.with_timezone(tz).format(format).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::{partition, BusyInterval, Schedule};
    use crate::range::TimeRange;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn renders_busy_free_and_partial_days() {
        let range = TimeRange::new(at("2024-07-01T04:00:00Z"), at("2024-07-04T04:00:00Z")).unwrap();
        let schedule = Schedule {
            timezone: chrono_tz::America::New_York,
            intervals: vec![
                BusyInterval {
                    start: at("2024-07-01T04:00:00Z"),
                    end: at("2024-07-02T04:00:00Z"),
                },
                BusyInterval {
                    start: at("2024-07-03T13:30:00Z"),
                    end: at("2024-07-03T14:00:00Z"),
                },
            ],
        };
        let text = render_availability(&partition(&range, &schedule).unwrap());

        assert!(text.starts_with(
            "Here are your free timeslots from July 1, 2024 - July 4, 2024 (America/New_York):\n"
        ));
        assert!(text.contains("Monday, July 1, 2024\nNo free time on this day.\n"));
        assert!(text.contains("Tuesday, July 2, 2024\nThis day is completely free!\n"));
        assert!(text.contains("Wednesday, July 3, 2024\n12:00 AM - 9:30 AM\n10:00 AM - midnight\n"));
    }

    #[test]
    fn empty_event_list() {
        assert_eq!(render_events(&[], &chrono_tz::UTC), "You have no upcoming events.\n");
    }
}
