//! Connection settings for the admin API.

use crate::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable holding the API base URL.
pub const API_URL_VAR: &str = "JOBDESK_API_URL";
/// Environment variable holding the bearer token.
pub const ACCESS_TOKEN_VAR: &str = "JOBDESK_ACCESS_TOKEN";
/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_VAR: &str = "JOBDESK_TIMEOUT_SECS";

/// Where the admin API lives and how to authenticate against it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL, e.g. `https://api.jobdesk.vn`. May carry a path prefix.
    pub base_url: String,
    /// Sent as `Authorization: Bearer …` when set.
    pub access_token: Option<String>,
    /// Whole-request timeout.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            access_token: None,
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Reads overrides from the process environment.
    pub fn from_env() -> ClientResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`. Unset or empty variables keep the
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ClientResult<Self> {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(url) = read(API_URL_VAR) {
            config.base_url = url;
        }
        config.access_token = read(ACCESS_TOKEN_VAR);
        if let Some(raw) = read(TIMEOUT_VAR) {
            config.timeout_secs = raw.parse().map_err(|_| {
                ClientError::Config(format!("{TIMEOUT_VAR} must be a whole number, got {raw:?}"))
            })?;
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
