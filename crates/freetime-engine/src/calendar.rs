//! The calendar provider boundary.
//!
//! Fetching busy time is the only await point in a `freetime` request; the
//! rest of the pipeline is synchronous. Implementations own authentication,
//! token refresh and transport; the engine only sees the results below.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::availability::{BusyInterval, Schedule};
use crate::config::parse_timezone;
use crate::error::{CollaboratorError, DataIntegrityError};
use crate::range::TimeRange;

/// Busy time as the provider reports it, timezone not yet validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSchedule {
    /// IANA identifier of the calendar's timezone.
    pub timezone: String,
    /// Busy intervals overlapping the requested range.
    pub intervals: Vec<BusyInterval>,
}

impl ProviderSchedule {
    /// # Errors
    /// [`DataIntegrityError::UnknownTimezone`] if the identifier is not IANA.
    pub fn into_schedule(self) -> Result<Schedule, DataIntegrityError> {
        let timezone = parse_timezone(&self.timezone)
            .map_err(|_| DataIntegrityError::UnknownTimezone(self.timezone.clone()))?;
        Ok(Schedule {
            timezone,
            intervals: self.intervals,
        })
    }
}

/// An event as stored by the calendar provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Event title.
    pub summary: String,
    /// Start time of the event.
    pub start: DateTime<Utc>,
    /// End time of the event.
    pub end: DateTime<Utc>,
    /// Optional free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Upcoming events plus the calendar's timezone for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventListing {
    /// IANA identifier used to display event times.
    pub timezone: String,
    /// Events that have not ended yet, ascending by start.
    pub events: Vec<CalendarEvent>,
}

/// An event to insert. `timezone` is the IANA zone the times were given in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEvent {
    /// Event title; the provider picks a placeholder when absent.
    pub title: Option<String>,
    /// Optional free-form notes.
    pub description: Option<String>,
    /// When the event takes place.
    pub range: TimeRange,
    /// IANA identifier the start and end were typed in.
    pub timezone: String,
}

/// Loads busy intervals for a resolved range. `account` is the chat identity
/// of the person issuing the command.
#[async_trait]
pub trait BusyIntervalLoader: Send + Sync {
    /// Busy intervals overlapping `range`, ascending by start.
    async fn load_busy(
        &self,
        account: &str,
        range: &TimeRange,
    ) -> Result<ProviderSchedule, CollaboratorError>;
}

/// The full set of provider operations the chat commands use.
#[async_trait]
pub trait CalendarProvider: BusyIntervalLoader {
    /// Events that end after `from` (including any in progress), ascending by start.
    async fn upcoming_events(
        &self,
        account: &str,
        from: DateTime<Utc>,
    ) -> Result<EventListing, CollaboratorError>;

    async fn insert_event(&self, account: &str, event: NewEvent) -> Result<(), CollaboratorError>;

    /// Exchange a redeemed authorization grant for stored credentials.
    async fn link_account(&self, account: &str, grant: &str) -> Result<(), CollaboratorError>;
}
