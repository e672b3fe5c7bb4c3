use std::time::Duration;

use crate::manual::ManualParsePolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    /// Maximum level for the subscriber the host application installs.
    /// The libraries only emit `tracing` events and never read this.
    pub log_level: tracing::Level,
    /// Base URL of the submission backend. `None` means payloads are only logged.
    pub submit_url: Option<String>,
    pub submit_timeout_secs: u64,
    pub submit_max_retries: u32,
    pub submit_retry_backoff_ms: u64,
    pub submit_user_agent: String,
    pub geo_high_accuracy: bool,
    pub geo_timeout_ms: u64,
    pub geo_maximum_age_ms: u64,
    pub manual_coordinate_policy: ManualParsePolicy,
    pub map_zoom: u8,
}

impl AppConfig {
    #[must_use]
    pub fn geo_timeout(&self) -> Duration {
        Duration::from_millis(self.geo_timeout_ms)
    }

    #[must_use]
    pub fn geo_maximum_age(&self) -> Duration {
        Duration::from_millis(self.geo_maximum_age_ms)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The submit URL may embed credentials in its userinfo part.
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("submit_url", &self.submit_url.as_ref().map(|_| "[redacted]"))
            .field("submit_timeout_secs", &self.submit_timeout_secs)
            .field("submit_max_retries", &self.submit_max_retries)
            .field("submit_retry_backoff_ms", &self.submit_retry_backoff_ms)
            .field("submit_user_agent", &self.submit_user_agent)
            .field("geo_high_accuracy", &self.geo_high_accuracy)
            .field("geo_timeout_ms", &self.geo_timeout_ms)
            .field("geo_maximum_age_ms", &self.geo_maximum_age_ms)
            .field("manual_coordinate_policy", &self.manual_coordinate_policy)
            .field("map_zoom", &self.map_zoom)
            .finish()
    }
}
