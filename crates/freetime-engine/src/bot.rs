//! Chat command dispatch.
//!
//! Each incoming message is parsed into a [`Command`] and handled by
//! [`Bot::dispatch`], which returns the reply together with whether any
//! command recognised the message. The transport decides what to do with an
//! unhandled message; nothing here keeps per-message state.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono_tz::Tz;
use tracing::{debug, info, warn};

use crate::availability::partition;
use crate::calendar::{CalendarProvider, NewEvent};
use crate::clock::Clock;
use crate::config::{parse_timezone, BotConfig};
use crate::dates::parse_datetime;
use crate::error::{CollaboratorError, DataIntegrityError, EngineError, RangeError, Result};
use crate::link::LinkStore;
use crate::range::{resolve_range, TimeRange};
use crate::report::{render_availability, render_events};

pub const HELP_TEXT: &str = "Here are all the commands:
calendar - lists your upcoming calendar events
create event - creates a calendar event. Parameters: -title, -description, -start, -end, -timezone. Example: create event -start August 3 2021 15:00 -end August 3 2021 17:00 -timezone America/New_York -title meeting -description meet with friends
freetime in <N> - free timeslots over the next N days
freetime start: <date> end: <date> - free timeslots between two dates, e.g. freetime start: 17 July 2021 end: 20 July 2021
freetime <date> - free timeslots on one day, e.g. freetime 17 July 2021
verify <code> - finish connecting your calendar";

/// A parsed chat message. Arguments keep their original case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Verify { code: Option<String> },
    Calendar,
    FreeTime { args: Vec<String> },
    CreateEvent { args: Vec<String> },
    Unknown { text: String },
}

impl Command {
    pub fn parse(text: &str) -> Self {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let args = |from: usize| -> Vec<String> { tokens[from..].iter().map(|t| t.to_string()).collect() };
        let word = |i: usize| tokens.get(i).map(|t| t.to_lowercase());

        match word(0).as_deref() {
            Some("help") => Self::Help,
            Some("verify") => Self::Verify {
                code: tokens.get(1).map(|t| t.to_string()),
            },
            Some("calendar") => Self::Calendar,
            Some("freetime") => Self::FreeTime { args: args(1) },
            Some("create") if word(1).as_deref() == Some("event") => {
                Self::CreateEvent { args: args(2) }
            }
            _ => Self::Unknown {
                text: text.trim().to_string(),
            },
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Verify { .. } => "verify",
            Self::Calendar => "calendar",
            Self::FreeTime { .. } => "freetime",
            Self::CreateEvent { .. } => "create event",
            Self::Unknown { .. } => "unknown",
        }
    }
}

/// Outcome of one dispatch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    /// Whether a command recognised the message.
    pub handled: bool,
    pub reply: String,
}

pub struct Bot {
    config: BotConfig,
    reference_tz: Tz,
    provider: Arc<dyn CalendarProvider>,
    links: Arc<dyn LinkStore>,
    clock: Arc<dyn Clock>,
}

impl Bot {
    pub fn new(
        config: BotConfig,
        provider: Arc<dyn CalendarProvider>,
        links: Arc<dyn LinkStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let reference_tz = config.reference_timezone()?;
        Ok(Self {
            config,
            reference_tz,
            provider,
            links,
            clock,
        })
    }

    /// Called by the OAuth redirect handler: returns the message to show the
    /// user, containing the code they must send back.
    pub fn issue_link(&self, grant: String) -> String {
        let code = self.links.issue(grant, self.clock.now());
        format!(
            "To connect your calendar to your chat account, send the bot this message: verify {code}"
        )
    }

    pub async fn dispatch(&self, person: &str, text: &str) -> Dispatch {
        let command = Command::parse(text);
        debug!(person, command = command.name(), "dispatching message");

        let outcome = match command {
            Command::Help => Ok(HELP_TEXT.to_string()),
            Command::Verify { code } => self.verify(person, code.as_deref()).await,
            Command::Calendar => self.calendar(person).await,
            Command::FreeTime { args } => self.free_time(person, &args).await,
            Command::CreateEvent { args } => self.create_event(person, &args).await,
            Command::Unknown { text } => {
                return Dispatch {
                    handled: false,
                    reply: format!(
                        "Sorry, I don't know how to respond to \"{text}\". You may see all my commands by sending \"help\"."
                    ),
                };
            }
        };

        let reply = outcome.unwrap_or_else(|err| self.error_reply(person, &err));
        Dispatch {
            handled: true,
            reply,
        }
    }

    async fn verify(&self, person: &str, code: Option<&str>) -> Result<String> {
        let Some(code) = code else {
            return Ok("Please include your verification code: verify <code>".to_string());
        };
        let Some(grant) = self.links.redeem(code, self.clock.now()) else {
            return Ok("Couldn't find that verification code. Make sure you copied the command correctly, or connect again if it has expired.".to_string());
        };
        self.provider.link_account(person, &grant).await?;
        info!(person, "calendar account linked");
        Ok("Setup complete! You can now use calendar commands.".to_string())
    }

    async fn calendar(&self, person: &str) -> Result<String> {
        let listing = self.provider.upcoming_events(person, self.clock.now()).await?;
        let tz = parse_timezone(&listing.timezone)
            .map_err(|_| DataIntegrityError::UnknownTimezone(listing.timezone.clone()))?;
        Ok(render_events(&listing.events, &tz))
    }

    async fn free_time(&self, person: &str, args: &[String]) -> Result<String> {
        let range = resolve_range(args, self.clock.now(), &self.reference_tz)?;
        debug!(start = %range.start(), end = %range.end(), "resolved free time range");

        let schedule = self.provider.load_busy(person, &range).await?.into_schedule()?;
        let availability = partition(&range, &schedule)?;
        Ok(render_availability(&availability))
    }

    async fn create_event(&self, person: &str, args: &[String]) -> Result<String> {
        let mut params = event_params(args);
        let (tz, timezone) = match params.remove("timezone") {
            Some(name) => (parse_timezone(&name)?, name),
            None => (self.reference_tz, self.reference_tz.name().to_string()),
        };
        let start = required_date(&params, "start", &tz)?;
        let end = required_date(&params, "end", &tz)?;

        let event = NewEvent {
            title: params.remove("title"),
            description: params.remove("description"),
            range: TimeRange::new(start, end)?,
            timezone,
        };
        self.provider.insert_event(person, event).await?;
        info!(person, "event created");
        Ok("You have successfully scheduled an event in your calendar.".to_string())
    }

    fn error_reply(&self, person: &str, err: &EngineError) -> String {
        let auth_url = &self.config.auth_url;
        match err {
            EngineError::Range(e) => e.to_string(),
            EngineError::Collaborator(CollaboratorError::NoLinkedAccount) => format!(
                "This bot needs permission before being able to access your calendar. Please connect your account here: {auth_url}"
            ),
            EngineError::Collaborator(CollaboratorError::RevokedCredential) => {
                info!(person, "calendar credential revoked");
                format!(
                    "The credential associated with your account has either expired or been revoked. Please reconnect your account here if you wish to: {auth_url}"
                )
            }
            EngineError::Collaborator(e @ CollaboratorError::Provider(_)) => {
                warn!(person, error = %e, "calendar provider failed");
                "Your calendar provider could not complete the request. Please try again later.".to_string()
            }
            EngineError::DataIntegrity(e) => {
                warn!(person, error = %e, "calendar provider returned inconsistent data");
                "Your calendar returned data I could not make sense of. Please try again later.".to_string()
            }
            EngineError::Config(e) => {
                warn!(error = %e, "configuration error during dispatch");
                "Something went wrong on my side. Please try again later.".to_string()
            }
        }
    }
}

/// `-title team sync -start 1 May 2024 9:00` → `{title: "team sync", start: "1 May 2024 9:00"}`.
/// Keys are lowercased; words before the first key are ignored.
fn event_params(args: &[String]) -> BTreeMap<String, String> {
    let mut params: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    let mut current: Option<String> = None;
    for arg in args {
        match arg.strip_prefix('-').filter(|key| !key.is_empty()) {
            Some(key) => {
                let key = key.to_lowercase();
                params.entry(key.clone()).or_default().clear();
                current = Some(key);
            }
            None => {
                if let Some(values) = current.as_ref().and_then(|k| params.get_mut(k)) {
                    values.push(arg);
                }
            }
        }
    }
    params
        .into_iter()
        .map(|(key, words)| (key, words.join(" ")))
        .collect()
}

fn required_date(
    params: &BTreeMap<String, String>,
    key: &str,
    tz: &Tz,
) -> std::result::Result<chrono::DateTime<chrono::Utc>, RangeError> {
    match params.get(key).filter(|v| !v.is_empty()) {
        Some(value) => parse_datetime(value, tz),
        None => Err(RangeError::MissingField(key.to_string())),
    }
}
