//! Client configuration structures
//!
//! Every section has serde defaults, so a config file only needs the keys it
//! changes. Loading from files and the environment lives in the infra crate.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_PATH, DEFAULT_HOST, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_JOB_BUDGET_SECS,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_PORT, DEFAULT_PROTOCOL, DEFAULT_RETRY_BACKOFF_MS,
    DEFAULT_TRANSPORT_ATTEMPTS,
};
use crate::errors::{CloudCallError, Result};
use crate::types::Credentials;

/// Complete client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Where to send requests.
    pub endpoint: EndpointConfig,
    /// Transport timeout and retry settings.
    pub http: HttpConfig,
    /// Async job polling settings.
    pub jobs: JobConfig,
    /// Absent for unauthenticated access to a trusted local port.
    pub credentials: Option<CredentialsConfig>,
}

impl ClientConfig {
    /// Check cross-field constraints.
    ///
    /// # Errors
    /// Returns [`CloudCallError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.endpoint.validate()?;

        if self.http.max_attempts == 0 {
            return Err(CloudCallError::Config("http.max_attempts must be at least 1".into()));
        }
        if self.http.timeout_secs == 0 {
            return Err(CloudCallError::Config("http.timeout_secs must be at least 1".into()));
        }
        if self.jobs.poll_interval_secs == 0 {
            return Err(CloudCallError::Config("jobs.poll_interval_secs must be at least 1".into()));
        }
        if let Some(credentials) = &self.credentials {
            if credentials.api_key.trim().is_empty() {
                return Err(CloudCallError::Config("credentials.api_key is empty".into()));
            }
            if credentials.secret_key.is_empty() {
                return Err(CloudCallError::Config("credentials.secret_key is empty".into()));
            }
        }

        Ok(())
    }

    /// Runtime credentials, if configured.
    pub fn credentials(&self) -> Option<Credentials> {
        self.credentials.as_ref().map(CredentialsConfig::to_credentials)
    }
}

/// Where the management API lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// `http` or `https`.
    pub protocol: String,
    /// Host name or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// API path; a leading slash is optional.
    pub path: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            protocol: DEFAULT_PROTOCOL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            path: DEFAULT_API_PATH.to_string(),
        }
    }
}

impl EndpointConfig {
    /// Endpoint on the default API path.
    pub fn new(protocol: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self { protocol: protocol.into(), host: host.into(), port, ..Self::default() }
    }

    /// Override the API path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// `protocol://host:port/path`, with exactly one slash before the path.
    pub fn base_url(&self) -> String {
        let path = self.path.trim_start_matches('/');
        format!("{}://{}:{}/{}", self.protocol, self.host, self.port, path)
    }

    fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(CloudCallError::Config("endpoint.host is empty".into()));
        }
        match self.protocol.as_str() {
            "http" | "https" => Ok(()),
            other => Err(CloudCallError::Config(format!(
                "endpoint.protocol must be http or https, got '{other}'"
            ))),
        }
    }
}

/// Transport tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-attempt connect plus read timeout.
    pub timeout_secs: u64,
    /// Total attempts per request (initial try + retries) when the connection
    /// cannot be established. Timeouts are never retried.
    pub max_attempts: u32,
    /// Delay between attempts; zero retries immediately.
    pub retry_backoff_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            max_attempts: DEFAULT_TRANSPORT_ATTEMPTS,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}

impl HttpConfig {
    /// [`HttpConfig::timeout_secs`] as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// [`HttpConfig::retry_backoff_ms`] as a duration.
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Async job polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Seconds between status queries.
    pub poll_interval_secs: u64,
    /// Seconds of polling before a job times out.
    pub budget_secs: u64,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self { poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS, budget_secs: DEFAULT_JOB_BUDGET_SECS }
    }
}

impl JobConfig {
    /// Poll interval as a duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Job budget as a duration.
    pub fn budget(&self) -> Duration {
        Duration::from_secs(self.budget_secs)
    }
}

/// Credentials as they appear in a config file.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Public API key.
    pub api_key: String,
    /// Shared signing secret.
    pub secret_key: String,
}

impl CredentialsConfig {
    /// Convert to runtime credentials.
    pub fn to_credentials(&self) -> Credentials {
        Credentials::new(self.api_key.clone(), self.secret_key.as_bytes().to_vec())
    }
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("api_key", &self.api_key)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}
