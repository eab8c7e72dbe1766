//! Client configuration with sensible defaults.
//!
//! Values can be baked in at build time through `TASKIO_API_URL` and
//! `TASKIO_LOG`; everything else uses [`ClientConfig::default`].

use log::LevelFilter;

use crate::models::PerPage;

pub const DEFAULT_API_URL: &str = "http://localhost:3333";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid API base URL {url:?}: {reason}")]
    BaseUrl { url: String, reason: String },

    #[error("config error: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API, without trailing slash.
    pub api_base_url: String,
    /// Per-request timeout. Only honoured on native targets; the browser
    /// fetch API has no timeout knob.
    pub request_timeout_secs: u64,
    /// How long a notification stays on screen.
    pub notice_duration_ms: u32,
    /// Page size selected when the task list first opens.
    pub default_per_page: PerPage,
    pub log_level: LevelFilter,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 15,
            notice_duration_ms: 4000,
            default_per_page: PerPage::Five,
            log_level: if cfg!(debug_assertions) { LevelFilter::Debug } else { LevelFilter::Info },
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by the build-time environment.
    pub fn from_env() -> Self {
        Self::from_values(option_env!("TASKIO_API_URL"), option_env!("TASKIO_LOG"))
    }

    fn from_values(api_url: Option<&str>, log_level: Option<&str>) -> Self {
        let mut config = Self::default();
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            config.api_base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(level) = log_level.and_then(|l| l.parse::<LevelFilter>().ok()) {
            config.log_level = level;
        }
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.api_base_url).map_err(|e| ConfigError::BaseUrl {
            url: self.api_base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::BaseUrl {
                url: self.api_base_url.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be greater than 0".into()));
        }
        if self.notice_duration_ms == 0 {
            return Err(ConfigError::Invalid("notice_duration_ms must be greater than 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ClientConfig::default().validate().is_ok());
    }

    #[test]
    fn test_env_values_override_defaults() {
        let config = ClientConfig::from_values(Some("https://api.taskio.dev/"), Some("warn"));
        assert_eq!(config.api_base_url, "https://api.taskio.dev");
        assert_eq!(config.log_level, LevelFilter::Warn);
    }

    #[test]
    fn test_unparseable_log_level_is_ignored() {
        let config = ClientConfig::from_values(None, Some("chatty"));
        assert_eq!(config.log_level, ClientConfig::default().log_level);
        assert_eq!(config.api_base_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_rejects_non_http_url() {
        let config = ClientConfig {
            api_base_url: "ftp://files.example.com".into(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::BaseUrl { .. })));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let config = ClientConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
