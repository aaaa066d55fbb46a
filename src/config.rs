//! Configuration and settings management
//!
//! Loads settings from config files and environment variables and defines
//! bot-wide constants.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token (`TELEGRAM_BOT_TOKEN`)
    pub telegram_bot_token: String,

    /// Port of the liveness HTTP server (`PORT`)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path or name of the yt-dlp executable (`YTDLP_PATH`)
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: String,

    /// Number of results requested per search (`SEARCH_LIMIT`)
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Upper bound on a single yt-dlp run in seconds (`SEARCH_TIMEOUT_SECS`)
    #[serde(default = "default_search_timeout_secs")]
    pub search_timeout_secs: u64,

    /// Maximum number of user sessions kept in memory (`SESSION_MAX_CAPACITY`)
    #[serde(default = "default_session_max_capacity")]
    pub session_max_capacity: u64,

    /// Idle time after which a session is dropped (`SESSION_IDLE_SECS`)
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_ytdlp_path() -> String {
    "yt-dlp".to_string()
}

const fn default_search_limit() -> usize {
    SEARCH_RESULT_LIMIT
}

const fn default_search_timeout_secs() -> u64 {
    SEARCH_TIMEOUT_SECS
}

const fn default_session_max_capacity() -> u64 {
    SESSION_MAX_CAPACITY
}

const fn default_session_idle_secs() -> u64 {
    SESSION_IDLE_SECS
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use nasur_bot::config::Settings;
    ///
    /// let settings = Settings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or the bot token is missing.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Not checked into git
            .add_source(File::with_name("config/local").required(false))
            // Eg. `APP__PORT=9000 ./target/nasur-bot`
            .add_source(Environment::with_prefix("APP").separator("__"))
            // Environment::default() maps UPPER_SNAKE_CASE to snake_case;
            // ignore_empty treats empty env vars as unset
            .add_source(
                Environment::default()
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

/// Trigger word that starts a search
pub const TRIGGER_WORD: &str = "نصور";

/// Developer signature shown in bot messages
pub const DEVELOPER_NAME: &str = "﴿ناصر﴾";

/// Default port of the liveness server
pub const DEFAULT_PORT: u16 = 8080;
/// Default number of results per search
pub const SEARCH_RESULT_LIMIT: usize = 5;
/// Default yt-dlp timeout in seconds
pub const SEARCH_TIMEOUT_SECS: u64 = 30;
/// Default session store capacity
pub const SESSION_MAX_CAPACITY: u64 = 100_000;
/// Default session idle expiry (24 hours)
pub const SESSION_IDLE_SECS: u64 = 86_400;

// Telegram API retry configuration
/// Initial backoff for Telegram API retries
pub const TELEGRAM_API_INITIAL_BACKOFF_MS: u64 = 500;
/// Maximum backoff for Telegram API retries
pub const TELEGRAM_API_MAX_BACKOFF_MS: u64 = 4000;
/// Maximum attempts for Telegram API operations
pub const TELEGRAM_API_MAX_RETRIES: usize = 3;

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    // Single test so env mutations cannot race each other
    #[test]
    fn test_config_env_loading() -> Result<(), Box<dyn std::error::Error>> {
        env::remove_var("PORT");
        env::remove_var("SEARCH_LIMIT");

        // 1. Defaults
        env::set_var("TELEGRAM_BOT_TOKEN", "dummy_token");
        let settings = Settings::new()?;
        assert_eq!(settings.telegram_bot_token, "dummy_token");
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.search_limit, SEARCH_RESULT_LIMIT);
        assert_eq!(settings.ytdlp_path, "yt-dlp");

        // 2. Overrides from environment
        env::set_var("PORT", "9090");
        env::set_var("SEARCH_LIMIT", "3");
        let settings = Settings::new()?;
        assert_eq!(settings.port, 9090);
        assert_eq!(settings.search_limit, 3);
        env::remove_var("PORT");
        env::remove_var("SEARCH_LIMIT");

        // 3. Empty port is treated as unset
        env::set_var("PORT", "");
        let settings = Settings::new()?;
        assert_eq!(settings.port, DEFAULT_PORT);
        env::remove_var("PORT");

        // 4. Missing token is an error
        env::remove_var("TELEGRAM_BOT_TOKEN");
        assert!(Settings::new().is_err());

        Ok(())
    }
}
