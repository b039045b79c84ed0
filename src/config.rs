use cosmic::cosmic_config::{self, CosmicConfigEntry, cosmic_config_derive::CosmicConfigEntry};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const CONFIG_VERSION: u64 = 1;

/// Environment variable that overrides the configured service URL at startup.
pub const SERVICE_URL_ENV: &str = "USERS_SERVICE_URL";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, CosmicConfigEntry)]
pub struct RosterConfig {
    /// Base URL of the users service, e.g. `http://localhost:5001`.
    pub service_url: String,
    /// Per-request timeout; 0 disables it.
    pub request_timeout_secs: u64,
    pub debug_logging: bool,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            service_url: String::new(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            debug_logging: false,
        }
    }
}

impl RosterConfig {
    /// Apply `USERS_SERVICE_URL` if it is set and non-empty.
    pub fn with_env_overrides(self) -> Self {
        self.with_service_url_override(std::env::var(SERVICE_URL_ENV).ok())
    }

    pub fn with_service_url_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            let url = url.trim();
            if !url.is_empty() {
                log::info!("Using users service URL from {}: {}", SERVICE_URL_ENV, url);
                self.service_url = url.to_string();
            }
        }
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.service_url.trim().is_empty()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.request_timeout_secs))
        }
    }
}
