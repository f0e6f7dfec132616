//! Runtime configuration shared by the realtime session and the webhook.
//!
//! A [`BotConfig`] is assembled once from the command line (with environment
//! fallbacks) and handed to each component behind an `Arc`.

use std::time::Duration;

use thiserror::Error;

/// Default platform web API base
pub const DEFAULT_API_BASE_URL: &str = "https://slack.com/api";

/// Default session-start method returning the realtime stream URL
pub const DEFAULT_SESSION_METHOD: &str = "rtm.start";

/// Default catalog API host
pub const DEFAULT_CATALOG_BASE_URL: &str = "https://i.bittwiddlers.org";

/// Default base for image links in replies
pub const DEFAULT_IMAGE_BASE_URL: &str = "http://i.bittwiddlers.org";

/// Liveness probe interval on the realtime stream
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(15);

/// Maximum characters per posted message
pub const DEFAULT_CHUNK_LIMIT: usize = 4000;

pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Trigger word the outgoing webhook is configured with
pub const DEFAULT_TRIGGER_WORD: &str = "bitsbot";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    Missing(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("retry base delay ({base:?}) must not exceed the retry cap ({max:?})")]
    RetryRange { base: Duration, max: Duration },
}

/// Reconnect delay bounds for the session supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay ceiling for the first failed attempt
    pub base: Duration,
    /// Upper bound on any delay
    pub max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(500),
            max: Duration::from_secs(30),
        }
    }
}

/// Everything the bot needs to talk to the chat platform and the catalog
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Platform API token
    pub slack_token: String,

    /// Value of the `Authorization` header sent to the catalog
    pub catalog_auth: String,

    /// The bot's user id (e.g. `U03ABCDEF`); empty in webhook mode
    pub bot_user_id: String,

    pub api_base_url: String,
    pub session_method: String,
    pub catalog_base_url: String,
    pub image_base_url: String,

    /// Ask the catalog to pre-filter by keywords instead of listing everything
    pub server_search: bool,

    pub trigger_word: String,
    pub probe_interval: Duration,
    pub chunk_limit: usize,
    pub workers: usize,
    pub queue_capacity: usize,
    pub retry: RetryPolicy,
    pub http_timeout: Duration,
}

impl BotConfig {
    /// Create a configuration with default endpoints and limits
    pub fn new(slack_token: impl Into<String>, catalog_auth: impl Into<String>) -> Self {
        Self {
            slack_token: slack_token.into(),
            catalog_auth: catalog_auth.into(),
            bot_user_id: String::new(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            session_method: DEFAULT_SESSION_METHOD.to_string(),
            catalog_base_url: DEFAULT_CATALOG_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            server_search: false,
            trigger_word: DEFAULT_TRIGGER_WORD.to_string(),
            probe_interval: DEFAULT_PROBE_INTERVAL,
            chunk_limit: DEFAULT_CHUNK_LIMIT,
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            retry: RetryPolicy::default(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_bot_user_id(mut self, bot_user_id: impl Into<String>) -> Self {
        self.bot_user_id = bot_user_id.into();
        self
    }

    /// Mention tag that prefixes messages addressed to the bot, e.g. `<@U03ABCDEF>`
    #[must_use]
    pub fn bot_tag(&self) -> String {
        format!("<@{}>", self.bot_user_id)
    }

    /// Check the settings every mode depends on.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slack_token.is_empty() {
            return Err(ConfigError::Missing("SLACK_TOKEN"));
        }
        if self.catalog_auth.is_empty() {
            return Err(ConfigError::Missing("BIT_AUTH"));
        }
        if self.probe_interval.is_zero() {
            return Err(ConfigError::Zero("probe interval"));
        }
        if self.chunk_limit == 0 {
            return Err(ConfigError::Zero("chunk limit"));
        }
        if self.workers == 0 {
            return Err(ConfigError::Zero("worker count"));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::Zero("queue capacity"));
        }
        if self.retry.base.is_zero() {
            return Err(ConfigError::Zero("retry base delay"));
        }
        if self.retry.base > self.retry.max {
            return Err(ConfigError::RetryRange {
                base: self.retry.base,
                max: self.retry.max,
            });
        }
        Ok(())
    }

    /// Additional checks for the realtime session.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when the bot user id is not set.
    pub fn validate_realtime(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if self.bot_user_id.is_empty() {
            return Err(ConfigError::Missing("BOT_USERID"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = BotConfig::new("xoxb-token", "secret");
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_limit, 4000);
        assert_eq!(config.probe_interval, Duration::from_secs(15));
    }

    #[test]
    fn test_bot_tag() {
        let config = BotConfig::new("t", "a").with_bot_user_id("U03ABCDEF");
        assert_eq!(config.bot_tag(), "<@U03ABCDEF>");
    }

    #[test]
    fn test_missing_tokens() {
        let config = BotConfig::new("", "a");
        assert_eq!(config.validate(), Err(ConfigError::Missing("SLACK_TOKEN")));

        let config = BotConfig::new("t", "");
        assert_eq!(config.validate(), Err(ConfigError::Missing("BIT_AUTH")));
    }

    #[test]
    fn test_realtime_requires_bot_user() {
        let config = BotConfig::new("t", "a");
        assert!(config.validate().is_ok());
        assert_eq!(
            config.validate_realtime(),
            Err(ConfigError::Missing("BOT_USERID"))
        );
    }

    #[test]
    fn test_zero_limits_rejected() {
        let mut config = BotConfig::new("t", "a");
        config.workers = 0;
        assert_eq!(config.validate(), Err(ConfigError::Zero("worker count")));

        let mut config = BotConfig::new("t", "a");
        config.chunk_limit = 0;
        assert_eq!(config.validate(), Err(ConfigError::Zero("chunk limit")));
    }

    #[test]
    fn test_retry_range() {
        let mut config = BotConfig::new("t", "a");
        config.retry = RetryPolicy {
            base: Duration::from_secs(10),
            max: Duration::from_secs(1),
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RetryRange { .. })
        ));
    }
}
