//! Chat backend configuration.
//!
//! Loaded once at startup and shared read-only by every session.

use std::time::Duration;

use crate::error::ConfigError;

/// Environment variable holding the API base URL.
pub const ENV_API_URL: &str = "TUTORCHAT_API_URL";
/// Environment variable holding the bearer token.
pub const ENV_API_KEY: &str = "TUTORCHAT_API_KEY";
/// Environment variable holding the connect timeout in seconds.
pub const ENV_CONNECT_TIMEOUT: &str = "TUTORCHAT_CONNECT_TIMEOUT_SECS";

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for talking to the chat backend.
///
/// # Example
///
/// ```ignore
/// use tutorchat::config::ChatConfig;
///
/// let config = ChatConfig::new("https://api.dify.ai/v1", "app-xxxx")
///     .with_connect_timeout(Duration::from_secs(5));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Base URL, without a trailing slash
    pub api_base_url: String,
    /// Bearer token sent with every request
    pub api_key: String,
    /// Upper bound on connection establishment
    pub connect_timeout: Duration,
}

impl ChatConfig {
    /// Create a configuration with the default connect timeout.
    pub fn new(api_base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let api_base_url = api_base_url.into().trim_end_matches('/').to_string();
        Self {
            api_base_url,
            api_key: api_key.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Load the configuration from `TUTORCHAT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = require_env(ENV_API_URL)?;
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                name: ENV_API_URL,
                reason: "must start with http:// or https://".to_string(),
            });
        }
        let api_key = require_env(ENV_API_KEY)?;

        let mut config = Self::new(api_base_url, api_key);
        if let Ok(raw) = std::env::var(ENV_CONNECT_TIMEOUT) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: ENV_CONNECT_TIMEOUT,
                reason: format!("expected a whole number of seconds, got {:?}", raw),
            })?;
            config = config.with_connect_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Endpoint for streamed chat turns.
    pub fn chat_messages_url(&self) -> String {
        format!("{}/chat-messages", self.api_base_url)
    }

    /// Value of the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.api_key)
    }
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::Missing(name)),
    }
}
