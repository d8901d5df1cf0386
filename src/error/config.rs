//! Configuration errors.

use thiserror::Error;

/// Errors raised while loading [`crate::config::ChatConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty
    #[error("missing required configuration: {0}")]
    Missing(&'static str),

    /// A value is present but cannot be used
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            ConfigError::Missing("TUTORCHAT_API_KEY").to_string(),
            "missing required configuration: TUTORCHAT_API_KEY"
        );
        assert_eq!(
            ConfigError::Invalid {
                name: "TUTORCHAT_API_URL",
                reason: "must start with http:// or https://".to_string(),
            }
            .to_string(),
            "invalid value for TUTORCHAT_API_URL: must start with http:// or https://"
        );
    }
}
