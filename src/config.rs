//! Configuration and settings management
//!
//! Loads settings from config files, environment variables and CLI
//! overrides, and defines the bot's fixed limits.

use crate::papers::SchemaVersion;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token
    #[serde(default)]
    pub telegram_token: String,

    /// Location of the papers table
    #[serde(default = "default_papers_path")]
    pub papers_path: String,

    /// Column layout of the papers table
    #[serde(default)]
    pub schema: SchemaVersion,

    /// Marker that identifies a message as a paper submission
    #[serde(default = "default_submission_tag")]
    pub submission_tag: String,

    /// Question shown above the poll
    #[serde(default = "default_poll_question")]
    pub poll_question: String,

    /// Timeout for fetching a submitted page, in seconds
    #[serde(default = "default_title_fetch_timeout_secs")]
    pub title_fetch_timeout_secs: u64,

    /// Maximum number of options in one poll
    #[serde(default = "default_max_poll_options")]
    pub max_poll_options: usize,
}

fn default_papers_path() -> String {
    "papers.tsv".to_string()
}

fn default_submission_tag() -> String {
    DEFAULT_SUBMISSION_TAG.to_string()
}

fn default_poll_question() -> String {
    "Papers for next week".to_string()
}

const fn default_title_fetch_timeout_secs() -> u64 {
    TITLE_FETCH_TIMEOUT_SECS
}

const fn default_max_poll_options() -> usize {
    MAX_POLL_OPTIONS
}

/// Values given on the command line; they win over every other source.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// `-t <token>`
    pub telegram_token: Option<String>,
    /// `--papers <path>`
    pub papers_path: Option<String>,
    /// `--schema <name>`
    pub schema: Option<SchemaVersion>,
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use paper_poll_bot::config::Settings;
    ///
    /// let settings = Settings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Local overrides, not checked into git
            .add_source(File::with_name("config/local").required(false))
            // `APP__PAPERS_PATH=...` style variables
            .add_source(Environment::with_prefix("APP").separator("__"))
            // Plain `TELEGRAM_TOKEN=...` style variables; empty values count as unset
            .add_source(Environment::default().ignore_empty(true))
            .build()?
            .try_deserialize()
    }

    /// Load settings and apply command line overrides.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or no bot token is set.
    pub fn load(overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut settings = Self::new()?;
        settings.apply(overrides);
        settings.validate()?;
        Ok(settings)
    }

    /// Apply command line overrides.
    pub fn apply(&mut self, overrides: CliOverrides) {
        if let Some(token) = overrides.telegram_token.filter(|t| !t.is_empty()) {
            self.telegram_token = token;
        }
        if let Some(path) = overrides.papers_path {
            self.papers_path = path;
        }
        if let Some(schema) = overrides.schema {
            self.schema = schema;
        }
    }

    /// Check that the settings can run a bot.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the token is missing or a limit is unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram_token.trim().is_empty() {
            return Err(ConfigError::Message(
                "bot token is missing: pass -t <token> or set TELEGRAM_TOKEN".to_string(),
            ));
        }
        if self.max_poll_options < MIN_POLL_OPTIONS {
            return Err(ConfigError::Message(format!(
                "max_poll_options must be at least {MIN_POLL_OPTIONS}"
            )));
        }
        Ok(())
    }

    /// Papers table location
    #[must_use]
    pub fn papers_path(&self) -> PathBuf {
        PathBuf::from(&self.papers_path)
    }

    /// Page fetch timeout
    #[must_use]
    pub const fn title_fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.title_fetch_timeout_secs)
    }
}

/// Default submission marker
pub const DEFAULT_SUBMISSION_TAG: &str = "#статья146";

/// Telegram's upper limit on poll options
pub const MAX_POLL_OPTIONS: usize = 10;
/// Telegram's lower limit on poll options
pub const MIN_POLL_OPTIONS: usize = 2;

// Title fetching
/// Default page fetch timeout in seconds
pub const TITLE_FETCH_TIMEOUT_SECS: u64 = 15;
/// Extra attempts after a failed page fetch
pub const TITLE_FETCH_RETRIES: usize = 1;
/// Pause before retrying a page fetch
pub const TITLE_FETCH_RETRY_DELAY_MS: u64 = 500;
/// Redirects followed when fetching a page
pub const TITLE_FETCH_MAX_REDIRECTS: usize = 5;

// Telegram API retries
/// Initial backoff for Telegram API retries
pub const TELEGRAM_API_INITIAL_BACKOFF_MS: u64 = 500;
/// Maximum backoff for Telegram API retries
pub const TELEGRAM_API_MAX_BACKOFF_MS: u64 = 4000;
/// Retry attempts for Telegram API calls
pub const TELEGRAM_API_MAX_RETRIES: usize = 3;

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn settings() -> Settings {
        Settings {
            telegram_token: String::new(),
            papers_path: default_papers_path(),
            schema: SchemaVersion::default(),
            submission_tag: default_submission_tag(),
            poll_question: default_poll_question(),
            title_fetch_timeout_secs: TITLE_FETCH_TIMEOUT_SECS,
            max_poll_options: MAX_POLL_OPTIONS,
        }
    }

    // The only test that touches the process environment
    #[test]
    fn test_config_env_loading() -> Result<(), Box<dyn std::error::Error>> {
        env::set_var("TELEGRAM_TOKEN", "dummy_token");
        env::set_var("PAPERS_PATH", "/tmp/jc/papers.tsv");
        env::set_var("SCHEMA", "link_title");

        let settings = Settings::new()?;
        assert_eq!(settings.telegram_token, "dummy_token");
        assert_eq!(settings.papers_path, "/tmp/jc/papers.tsv");
        assert_eq!(settings.schema, SchemaVersion::LinkTitle);
        assert_eq!(settings.submission_tag, DEFAULT_SUBMISSION_TAG);
        assert_eq!(settings.max_poll_options, MAX_POLL_OPTIONS);

        env::remove_var("TELEGRAM_TOKEN");
        env::remove_var("PAPERS_PATH");
        env::remove_var("SCHEMA");
        Ok(())
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut settings = settings();
        settings.telegram_token = "from_env".to_string();
        settings.apply(CliOverrides {
            telegram_token: Some("from_cli".to_string()),
            papers_path: Some("other.tsv".to_string()),
            schema: Some(SchemaVersion::MessageLinkTitle),
        });
        assert_eq!(settings.telegram_token, "from_cli");
        assert_eq!(settings.papers_path(), PathBuf::from("other.tsv"));
        assert_eq!(settings.schema, SchemaVersion::MessageLinkTitle);

        settings.apply(CliOverrides {
            telegram_token: Some(String::new()),
            ..CliOverrides::default()
        });
        assert_eq!(settings.telegram_token, "from_cli");
    }

    #[test]
    fn test_validate() {
        let mut settings = settings();
        assert!(settings.validate().is_err());

        settings.telegram_token = "token".to_string();
        assert!(settings.validate().is_ok());

        settings.max_poll_options = 1;
        assert!(settings.validate().is_err());
    }
}
