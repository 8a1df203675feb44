//! Provider client interface.
//!
//! A provider is one remote service able to satisfy a capability. Providers
//! either return results synchronously or hand back a job handle the
//! [`JobPoller`](crate::poller::JobPoller) drives to completion. The crate
//! ships a single generic [`HttpProvider`]; anything with a different wire
//! shape implements [`Provider`] on the caller's side.

mod http;
mod status;

pub use http::HttpProvider;
pub use status::{JobMetrics, JobState, StatusPayload};

use async_trait::async_trait;
use serde_json::Value;

use crate::capability::Capability;
use crate::error::ProviderError;

/// Handle to an in-flight asynchronous job on a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    /// Name of the provider that issued the handle.
    pub provider: String,
    /// Provider-assigned job id, opaque to the core.
    pub job_id: String,
}

impl JobHandle {
    pub fn new(provider: impl Into<String>, job_id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            job_id: job_id.into(),
        }
    }
}

/// Outcome of submitting work to a provider.
#[derive(Debug, Clone)]
pub enum Submission {
    /// The provider produced the result synchronously.
    Completed(Value),
    /// The provider accepted the work and will report status for the handle.
    Queued(JobHandle),
}

/// Uniform request/response adapter for one remote provider.
///
/// Failure to reach the provider (network error, non-2xx) surfaces as
/// [`ProviderError::Unavailable`], never a panic.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable provider name used in logs, errors and candidate lists.
    fn name(&self) -> &str;

    /// Submit work for a capability.
    async fn submit(
        &self,
        capability: Capability,
        input: Value,
    ) -> Result<Submission, ProviderError>;

    /// Fetch the current status of a previously queued job.
    async fn fetch_status(&self, handle: &JobHandle) -> Result<StatusPayload, ProviderError>;
}
