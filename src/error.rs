//! Error types for genflow.

use std::time::Duration;

use crate::capability::Capability;

/// Top-level error type for the orchestration layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Provider client and job errors.
///
/// `Unavailable`, `JobFailed` and `JobTimedOut` are recoverable at the chain
/// level: the fallback chain logs them and advances to the next candidate.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider {provider} unavailable: {reason}")]
    Unavailable { provider: String, reason: String },

    #[error("Job {job_id} on provider {provider} failed: {reason}")]
    JobFailed {
        provider: String,
        job_id: String,
        reason: String,
    },

    #[error("Job {job_id} on provider {provider} timed out after {deadline:?}")]
    JobTimedOut {
        provider: String,
        job_id: String,
        deadline: Duration,
    },

    #[error("Polling cancelled for job {job_id} on provider {provider}")]
    Cancelled { provider: String, job_id: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Job {job_id} already in state {state}, cannot transition to {target}")]
    InvalidTransition {
        job_id: String,
        state: String,
        target: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Outbound message transport errors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to send message: {reason}")]
    SendFailed { reason: String },

    #[error("Failed to edit message {message_id}: {reason}")]
    EditFailed { message_id: String, reason: String },
}

/// Fallback chain errors.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("No configured candidates for capability {capability}")]
    NoCandidates { capability: Capability },

    #[error("All providers failed for capability {capability} after {attempts} attempts: {last}")]
    AllProvidersFailed {
        capability: Capability,
        attempts: u32,
        #[source]
        last: ProviderError,
    },

    #[error("Execution cancelled for capability {capability}")]
    Cancelled { capability: Capability },
}

/// Result type alias for the orchestration layer.
pub type Result<T> = std::result::Result<T, Error>;
