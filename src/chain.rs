//! Capability fallback chains.
//!
//! Wraps an ordered list of provider candidates per capability and tries each
//! in sequence until one succeeds. Adding a provider is a configuration
//! change, not a code change: the chain iterates candidate descriptors with a
//! single generic loop.

use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::capability::Capability;
use crate::config::OrchestratorConfig;
use crate::error::{ChainError, ProviderError};
use crate::notify::{NotifyPolicy, ProgressNotifier, Transport};
use crate::poller::JobPoller;
use crate::provider::{Provider, Submission};

/// Ordered entry in a capability's fallback list.
#[derive(Clone)]
pub struct ProviderCandidate {
    name: String,
    provider: Option<Arc<dyn Provider>>,
}

impl ProviderCandidate {
    /// A usable candidate.
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            name: provider.name().to_string(),
            provider: Some(provider),
        }
    }

    /// A candidate known in the chain order but lacking configuration (e.g.
    /// missing credentials). Skipped without counting as an attempt.
    pub fn unconfigured(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }
}

/// Successful outcome of one chain execution.
#[derive(Debug, Clone)]
pub struct ChainResult {
    pub output: serde_json::Value,
    /// Name of the candidate that produced the result.
    pub provider: String,
    /// Failed attempts before the successful one. Skipped unconfigured
    /// candidates do not count.
    pub failed_attempts: u32,
}

/// Builder for the immutable capability -> candidates table.
pub struct FallbackChainBuilder {
    config: OrchestratorConfig,
    candidates: HashMap<Capability, Vec<ProviderCandidate>>,
}

impl FallbackChainBuilder {
    pub fn new(config: OrchestratorConfig) -> Self {
        Self {
            config,
            candidates: HashMap::new(),
        }
    }

    /// Append a candidate to a capability's fallback list, in priority order.
    pub fn candidate(mut self, capability: Capability, candidate: ProviderCandidate) -> Self {
        self.candidates.entry(capability).or_default().push(candidate);
        self
    }

    /// Convenience for appending a configured provider.
    pub fn provider(self, capability: Capability, provider: Arc<dyn Provider>) -> Self {
        self.candidate(capability, ProviderCandidate::new(provider))
    }

    pub fn build(self) -> FallbackChain {
        FallbackChain {
            poller: JobPoller::new(self.config.poll_interval, self.config.job_deadline),
            notify: NotifyPolicy {
                min_delta: self.config.notify_min_delta,
                min_interval: self.config.notify_min_interval,
            },
            candidates: self.candidates,
        }
    }
}

/// Tries provider candidates in configured order and returns the first
/// success or an aggregate failure.
///
/// Candidates are attempted strictly sequentially within one call (providers
/// may bill per attempt; no speculative parallelism). Concurrent `execute`
/// calls share only this read-only configuration.
pub struct FallbackChain {
    candidates: HashMap<Capability, Vec<ProviderCandidate>>,
    poller: JobPoller,
    notify: NotifyPolicy,
}

impl FallbackChain {
    pub fn builder(config: OrchestratorConfig) -> FallbackChainBuilder {
        FallbackChainBuilder::new(config)
    }

    /// Candidates configured for a capability, in priority order.
    pub fn candidates(&self, capability: Capability) -> &[ProviderCandidate] {
        self.candidates
            .get(&capability)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Execute a capability request against its fallback list.
    ///
    /// Progress messages already sent by an abandoned candidate are left
    /// as-is; the chain never retracts them.
    pub async fn execute(
        &self,
        capability: Capability,
        input: serde_json::Value,
        transport: Arc<dyn Transport>,
        cancel: &CancellationToken,
    ) -> Result<ChainResult, ChainError> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "chain_execute",
            capability = %capability,
            request_id = %request_id,
        );
        self.execute_inner(capability, input, transport, cancel)
            .instrument(span)
            .await
    }

    async fn execute_inner(
        &self,
        capability: Capability,
        input: serde_json::Value,
        transport: Arc<dyn Transport>,
        cancel: &CancellationToken,
    ) -> Result<ChainResult, ChainError> {
        let candidates = self.candidates(capability);
        if candidates.is_empty() {
            return Err(ChainError::NoCandidates { capability });
        }

        let mut failed_attempts: u32 = 0;
        let mut last_error: Option<ProviderError> = None;

        for candidate in candidates {
            let Some(provider) = candidate.provider.as_deref() else {
                tracing::debug!(candidate = %candidate.name, "skipping unconfigured candidate");
                continue;
            };

            match self
                .attempt(capability, provider, input.clone(), Arc::clone(&transport), cancel)
                .await
            {
                Ok(output) => {
                    tracing::info!(
                        provider = %candidate.name,
                        failed_attempts,
                        "capability request satisfied"
                    );
                    return Ok(ChainResult {
                        output,
                        provider: candidate.name.clone(),
                        failed_attempts,
                    });
                }
                Err(ProviderError::Cancelled { .. }) => {
                    // A cancelled context must not fall through to further
                    // candidates.
                    return Err(ChainError::Cancelled { capability });
                }
                Err(err) => {
                    failed_attempts += 1;
                    tracing::warn!(
                        candidate = %candidate.name,
                        error = %err,
                        "candidate failed, trying next"
                    );
                    last_error = Some(err);
                }
            }
        }

        match last_error {
            Some(last) => Err(ChainError::AllProvidersFailed {
                capability,
                attempts: failed_attempts,
                last,
            }),
            // Every candidate was unconfigured
            None => Err(ChainError::NoCandidates { capability }),
        }
    }

    /// One attempt against one provider: synchronous results return directly,
    /// queued jobs are driven by the poller with a fresh per-job notifier.
    async fn attempt(
        &self,
        capability: Capability,
        provider: &dyn Provider,
        input: serde_json::Value,
        transport: Arc<dyn Transport>,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value, ProviderError> {
        match provider.submit(capability, input).await? {
            Submission::Completed(output) => Ok(output),
            Submission::Queued(handle) => {
                let label = format!("{} on {}", capability, provider.name());
                let mut notifier = ProgressNotifier::new(transport, self.notify, label);
                self.poller
                    .poll_to_completion(provider, &handle, capability, &mut notifier, cancel)
                    .await
            }
        }
    }
}
