//! A calendar provider backed by a single JSON file.
//!
//! ```json
//! {
//!   "timezone": "Europe/Berlin",
//!   "revoked": false,
//!   "events": [
//!     { "summary": "standup", "start": "2024-03-01T09:00:00Z", "end": "2024-03-01T09:15:00Z" }
//!   ]
//! }
//! ```
//!
//! A missing file stands for an account that was never linked, and
//! `"revoked": true` for a credential the provider no longer accepts.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use freetime_engine::{
    BusyInterval, BusyIntervalLoader, CalendarEvent, CalendarProvider, CollaboratorError,
    EventListing, NewEvent, ProviderSchedule, TimeRange,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CalendarFile {
    timezone: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    revoked: bool,
    #[serde(default)]
    events: Vec<CalendarEvent>,
}

pub struct JsonCalendar {
    path: PathBuf,
}

impl JsonCalendar {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse the file as stored, revoked or not.
    async fn read_raw(&self) -> Result<CalendarFile, CollaboratorError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CollaboratorError::NoLinkedAccount)
            }
            Err(e) => return Err(self.provider_error(e)),
        };
        serde_json::from_str(&text).map_err(|e| self.provider_error(e))
    }

    async fn read(&self) -> Result<CalendarFile, CollaboratorError> {
        let mut file = self.read_raw().await?;
        if file.revoked {
            return Err(CollaboratorError::RevokedCredential);
        }
        file.events.sort_by_key(|e| e.start);
        Ok(file)
    }

    fn provider_error(&self, e: impl std::fmt::Display) -> CollaboratorError {
        CollaboratorError::Provider(format!("{}: {}", self.path.display(), e))
    }

    async fn write(&self, file: &CalendarFile) -> Result<(), CollaboratorError> {
        let json = serde_json::to_string_pretty(file)
            .map_err(|e| CollaboratorError::Provider(e.to_string()))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| self.provider_error(e))
    }
}

#[async_trait]
impl BusyIntervalLoader for JsonCalendar {
    async fn load_busy(
        &self,
        _account: &str,
        range: &TimeRange,
    ) -> Result<ProviderSchedule, CollaboratorError> {
        let file = self.read().await?;
        let intervals: Vec<BusyInterval> = file
            .events
            .iter()
            .filter(|e| e.start < range.end() && e.end > range.start())
            .map(|e| BusyInterval {
                start: e.start,
                end: e.end,
            })
            .collect();
        debug!(path = %self.path.display(), intervals = intervals.len(), "loaded busy intervals");
        Ok(ProviderSchedule {
            timezone: file.timezone,
            intervals,
        })
    }
}

#[async_trait]
impl CalendarProvider for JsonCalendar {
    async fn upcoming_events(
        &self,
        _account: &str,
        from: DateTime<Utc>,
    ) -> Result<EventListing, CollaboratorError> {
        let file = self.read().await?;
        Ok(EventListing {
            timezone: file.timezone,
            events: file.events.into_iter().filter(|e| e.end > from).collect(),
        })
    }

    async fn insert_event(&self, _account: &str, event: NewEvent) -> Result<(), CollaboratorError> {
        let mut file = self.read().await?;
        file.events.push(CalendarEvent {
            summary: event.title.unwrap_or_else(|| "(untitled)".to_string()),
            start: event.range.start(),
            end: event.range.end(),
            description: event.description,
        });
        file.events.sort_by_key(|e| e.start);
        self.write(&file).await
    }

    /// Linking clears `revoked` on an existing calendar and keeps its events;
    /// a missing file becomes an empty UTC calendar.
    async fn link_account(&self, _account: &str, _grant: &str) -> Result<(), CollaboratorError> {
        let file = match self.read_raw().await {
            Ok(file) if !file.revoked => return Ok(()),
            Ok(file) => CalendarFile {
                revoked: false,
                ..file
            },
            Err(CollaboratorError::NoLinkedAccount) => CalendarFile {
                timezone: "UTC".to_string(),
                revoked: false,
                events: Vec::new(),
            },
            Err(e) => return Err(e),
        };
        debug!(path = %self.path.display(), "calendar linked");
        self.write(&file).await
    }
}
