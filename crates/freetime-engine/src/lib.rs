//! # freetime-engine
//!
//! Timezone-aware free time partitioning for calendar chat bots.
//!
//! A `freetime` request flows through a short pipeline: command arguments are
//! resolved into one [`TimeRange`], busy intervals for that range are fetched
//! from the calendar provider (the only async step), the range is split into
//! civil-day buckets in the calendar's timezone, and each bucket gets the
//! complement of its busy time.
//!
//! ## Modules
//!
//! - [`range`] — command arguments → validated [`TimeRange`]
//! - [`dates`] — free-text date parsing used by the resolver
//! - [`dst`] — wall-clock ↔ instant conversion across DST transitions
//! - [`bucket`] — range → civil-day buckets
//! - [`availability`] — buckets + busy intervals → free intervals per day
//! - [`calendar`] — calendar provider boundary (async traits)
//! - [`report`] — plain-text rendering
//! - [`link`] — verification codes for connecting a calendar account
//! - [`bot`] — chat command dispatch
//! - [`config`], [`clock`], [`error`]

pub mod availability;
pub mod bot;
pub mod bucket;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod dates;
pub mod dst;
pub mod error;
pub mod link;
pub mod range;
pub mod report;

pub use availability::{
    compute_availability, partition, Availability, BusyInterval, DayAvailability, FreeInterval,
    Schedule,
};
pub use bot::{Bot, Command, Dispatch};
pub use bucket::{day_buckets, DayBucket};
pub use calendar::{
    BusyIntervalLoader, CalendarEvent, CalendarProvider, EventListing, NewEvent, ProviderSchedule,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::BotConfig;
pub use error::{CollaboratorError, DataIntegrityError, EngineError, RangeError, Result};
pub use link::{InMemoryLinkStore, LinkStore};
pub use range::{resolve_range, RangeRequest, TimeRange};
