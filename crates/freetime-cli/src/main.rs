//! `freetime` CLI: free time reports and chat commands against a calendar file.
//!
//! ## Usage
//!
//! ```sh
//! # Free time over the next three days
//! freetime free --calendar cal.json in 3
//!
//! # Free time between two dates, as JSON
//! freetime free --calendar cal.json --json start: 1 March 2024 end: 5 March 2024
//!
//! # One day, reading dates in New York time
//! freetime --timezone America/New_York free --calendar cal.json 17 July 2021
//!
//! # Run a chat message through the bot
//! freetime say --calendar cal.json create event -start March 5 2024 15:00 -end March 5 2024 16:00 -title sync
//! ```

mod provider;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use freetime_engine::{
    partition, report, resolve_range, BotConfig, Bot, BusyIntervalLoader, Clock, FixedClock,
    InMemoryLinkStore, SystemClock,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::provider::JsonCalendar;

/// Account name used for the single calendar behind `--calendar`.
const LOCAL_ACCOUNT: &str = "local";

#[derive(Parser)]
#[command(
    name = "freetime",
    version,
    about = "Free time reports and calendar chat commands"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Reference timezone for dates typed without an offset (overrides the config)
    #[arg(long, global = true)]
    timezone: Option<String>,

    /// Pretend the current time is this RFC 3339 instant
    #[arg(long, global = true)]
    now: Option<DateTime<Utc>>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print free timeslots for a range given in `freetime` syntax
    Free {
        /// Calendar JSON file
        #[arg(long)]
        calendar: PathBuf,
        /// Print the per-day result as JSON instead of text
        #[arg(long)]
        json: bool,
        /// `in N`, `start: <date> end: <date>`, or a single date
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Run one chat message through the bot and print its reply
    Say {
        /// Calendar JSON file
        #[arg(long)]
        calendar: PathBuf,
        /// Chat identity of the sender
        #[arg(long, default_value = LOCAL_ACCOUNT)]
        person: String,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        message: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut config = match &cli.config {
        Some(path) => BotConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => BotConfig::default(),
    };
    if let Some(tz) = cli.timezone {
        config.timezone = tz;
    }
    config.validate()?;

    let clock: Arc<dyn Clock> = match cli.now {
        Some(now) => Arc::new(FixedClock(now)),
        None => Arc::new(SystemClock),
    };

    match cli.command {
        Commands::Free {
            calendar,
            json,
            args,
        } => {
            let calendar = JsonCalendar::new(calendar);
            let out = free(&config, &calendar, clock.now(), &args, json).await?;
            print!("{}", out);
        }
        Commands::Say {
            calendar,
            person,
            message,
        } => {
            let links = Arc::new(InMemoryLinkStore::new(config.link_ttl()));
            let bot = Bot::new(config, Arc::new(JsonCalendar::new(calendar)), links, clock)?;
            let dispatch = bot.dispatch(&person, &message.join(" ")).await;
            println!("{}", dispatch.reply.trim_end());
            if !dispatch.handled {
                process::exit(2);
            }
        }
    }

    Ok(())
}

async fn free(
    config: &BotConfig,
    calendar: &dyn BusyIntervalLoader,
    now: DateTime<Utc>,
    args: &[String],
    json: bool,
) -> Result<String> {
    let tz = config.reference_timezone()?;
    let range = resolve_range(args, now, &tz)?;
    debug!(start = %range.start(), end = %range.end(), "resolved range");

    let schedule = calendar
        .load_busy(LOCAL_ACCOUNT, &range)
        .await?
        .into_schedule()?;
    let availability = partition(&range, &schedule)?;

    if json {
        let mut out = serde_json::to_string_pretty(&availability)?;
        out.push('\n');
        Ok(out)
    } else {
        Ok(report::render_availability(&availability))
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::from_default_env().add_directive(level.parse()?);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
