//! Configuration for genflow.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Orchestration knobs, loaded once at startup and immutable thereafter.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Fixed delay between job status polls. No backoff: jobs are expected to
    /// complete in tens of seconds to minutes, so a constant interval keeps
    /// latency predictable.
    pub poll_interval: Duration,
    /// Hard deadline for one job, measured from submission.
    pub job_deadline: Duration,
    /// Minimum percent advance that triggers an immediate progress update.
    pub notify_min_delta: u8,
    /// Minimum time between progress updates when percent is not advancing.
    pub notify_min_interval: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(3_000),
            job_deadline: Duration::from_secs(600),
            notify_min_delta: 5,
            notify_min_interval: Duration::from_millis(15_000),
        }
    }
}

impl OrchestratorConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            poll_interval: Duration::from_millis(parse_env("GENFLOW_POLL_INTERVAL_MS", 3_000)?),
            job_deadline: Duration::from_secs(parse_env("GENFLOW_JOB_DEADLINE_SECS", 600)?),
            notify_min_delta: parse_env("GENFLOW_NOTIFY_MIN_DELTA", 5)?,
            notify_min_interval: Duration::from_millis(parse_env(
                "GENFLOW_NOTIFY_MIN_INTERVAL_MS",
                15_000,
            )?),
        })
    }
}

/// Connection settings for a generic JSON-over-HTTP provider.
#[derive(Debug, Clone)]
pub struct HttpProviderConfig {
    /// Base URL of the provider API (e.g. "https://api.example.com").
    pub base_url: String,
    /// Bearer token, if the provider requires one.
    pub api_key: Option<SecretString>,
    /// Per-request timeout for submit and status calls.
    pub request_timeout: Duration,
}

impl HttpProviderConfig {
    /// Load settings for the named provider from
    /// `GENFLOW_PROVIDER_<NAME>_{BASE_URL,API_KEY,TIMEOUT_SECS}`.
    ///
    /// Returns `Ok(None)` when no base URL is configured; the fallback chain
    /// treats such a candidate as "skip without counting as an attempt".
    pub fn from_env(name: &str) -> Result<Option<Self>, ConfigError> {
        let prefix = format!(
            "GENFLOW_PROVIDER_{}",
            name.to_uppercase().replace('-', "_")
        );

        let Some(base_url) = optional_env(&format!("{prefix}_BASE_URL")) else {
            return Ok(None);
        };
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                key: format!("{prefix}_BASE_URL"),
                message: "must start with http:// or https://".to_string(),
            });
        }

        let api_key = optional_env(&format!("{prefix}_API_KEY")).map(SecretString::from);
        let request_timeout =
            Duration::from_secs(parse_env(&format!("{prefix}_TIMEOUT_SECS"), 30)?);

        Ok(Some(Self {
            base_url,
            api_key,
            request_timeout,
        }))
    }
}

/// Read an env var and parse it, using `default` when the var is unset.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("cannot parse {raw:?}"),
        }),
        Err(std::env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: err.to_string(),
        }),
    }
}

/// Read an env var, treating unset and empty identically.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
