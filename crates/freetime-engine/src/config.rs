//! Bot configuration.
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! timezone = "America/New_York"
//! link_ttl_minutes = 15
//! auth_url = "https://calendar.example.com/connect"
//! ```

use std::path::Path;

use chrono::Duration;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, RangeError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// IANA timezone used to read dates typed without an offset.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// How long a verification code stays redeemable.
    #[serde(default = "default_link_ttl_minutes")]
    pub link_ttl_minutes: i64,

    /// Where users go to connect (or reconnect) their calendar.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            link_ttl_minutes: default_link_ttl_minutes(),
            auth_url: default_auth_url(),
        }
    }
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_link_ttl_minutes() -> i64 {
    10
}

fn default_auth_url() -> String {
    "http://localhost:8080/connect".to_string()
}

impl BotConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.reference_timezone()?;
        if self.link_ttl_minutes <= 0 {
            return Err(EngineError::Config(format!(
                "link_ttl_minutes must be positive, got {}",
                self.link_ttl_minutes
            )));
        }
        Ok(())
    }

    pub fn reference_timezone(&self) -> std::result::Result<Tz, RangeError> {
        parse_timezone(&self.timezone)
    }

    pub fn link_ttl(&self) -> Duration {
        Duration::minutes(self.link_ttl_minutes)
    }
}

/// Parse an IANA identifier such as `Europe/Berlin`.
pub fn parse_timezone(name: &str) -> std::result::Result<Tz, RangeError> {
    name.trim()
        .parse()
        .map_err(|_| RangeError::InvalidTimezone(name.to_string()))
}
