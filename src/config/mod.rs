//! Client configuration.
//!
//! Provides:
//! - service defaults matching the public API
//! - environment overrides for the key and base URL
//! - endpoint resolution for the transport

use std::env;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Environment variable holding the account key.
pub const CLIENT_KEY_ENV: &str = "CAPMONSTERCLOUD_CLIENTKEY";
/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "CAPMONSTERCLOUD_BASE_URL";

pub const DEFAULT_BASE_URL: &str = "https://api.capmonster.cloud/";
pub const DEFAULT_SOFT_ID: u32 = 58;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingClientKey(&'static str),
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

/// Transport-level settings shared by every solve issued through a client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub request_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: Duration,
    /// Software identifier reported with each created task.
    pub soft_id: Option<u32>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            request_timeout: Duration::from_secs(21),
            pool_max_idle_per_host: 10,
            pool_idle_timeout: Duration::from_secs(30),
            soft_id: Some(DEFAULT_SOFT_ID),
            user_agent: format!(
                "Zennolab.CapMonsterCloud.Client.Rust/{}",
                env!("CARGO_PKG_VERSION")
            ),
        }
    }
}

impl ClientConfig {
    /// Defaults, with `CAPMONSTERCLOUD_BASE_URL` applied when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(raw) = env::var(BASE_URL_ENV)
            && !raw.trim().is_empty()
        {
            config = config.with_base_url(raw.trim())?;
        }
        Ok(config)
    }

    /// Point the client at another deployment. A trailing slash is added so
    /// method names resolve beneath the given path.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        let mut url = Url::parse(base_url)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = url;
        Ok(self)
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_soft_id(mut self, soft_id: Option<u32>) -> Self {
        self.soft_id = soft_id;
        self
    }

    pub fn endpoint(&self, method: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(method)
    }
}

/// Read the account key from `CAPMONSTERCLOUD_CLIENTKEY`.
pub fn client_key_from_env() -> Result<String, ConfigError> {
    env::var(CLIENT_KEY_ENV)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or(ConfigError::MissingClientKey(CLIENT_KEY_ENV))
}
