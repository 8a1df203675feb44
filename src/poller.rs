//! Deadline-bounded job polling.
//!
//! Drives one submitted job handle to a terminal state: fetch status, feed it
//! to the progress sink, sleep a fixed interval, repeat. The deadline is hard
//! and measured from submission; a job with steady progress is still killed
//! when it crosses the deadline. Concurrent polls for different jobs are
//! fully independent.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

use crate::capability::Capability;
use crate::error::ProviderError;
use crate::job::{Job, JobStatus};
use crate::notify::ProgressSink;
use crate::provider::{JobHandle, JobState, Provider};

/// Polls submitted jobs at a fixed interval until terminal or deadline.
#[derive(Debug, Clone)]
pub struct JobPoller {
    poll_interval: Duration,
    job_deadline: Duration,
}

impl JobPoller {
    pub fn new(poll_interval: Duration, job_deadline: Duration) -> Self {
        Self {
            poll_interval,
            job_deadline,
        }
    }

    /// Drive a queued job to completion.
    ///
    /// Each status payload is passed to `sink` best-effort: a sink failure is
    /// logged and polling continues. Transient `fetch_status` errors are a
    /// no-op tick; only an explicit failure status, the deadline, or
    /// cancellation ends the job unsuccessfully.
    pub async fn poll_to_completion(
        &self,
        provider: &dyn Provider,
        handle: &JobHandle,
        capability: Capability,
        sink: &mut dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value, ProviderError> {
        let mut job = Job::new(handle, capability, self.job_deadline);
        tracing::info!(
            job_id = %job.id,
            provider = %job.provider,
            capability = %job.capability,
            deadline_secs = self.job_deadline.as_secs(),
            "polling job to completion"
        );

        loop {
            if cancel.is_cancelled() {
                return Err(self.cancelled(&job));
            }
            if job.expired(Instant::now()) {
                let _ = job.advance(JobStatus::TimedOut);
                tracing::warn!(
                    job_id = %job.id,
                    provider = %job.provider,
                    last_status = %job.last_payload.as_ref().map(|p| p.status.as_str()).unwrap_or(""),
                    "job deadline exceeded"
                );
                return Err(ProviderError::JobTimedOut {
                    provider: job.provider.clone(),
                    job_id: job.id.clone(),
                    deadline: self.job_deadline,
                });
            }

            match provider.fetch_status(handle).await {
                Ok(payload) => {
                    job.observe(&payload);
                    if let Err(err) = sink.on_status(&payload).await {
                        tracing::warn!(
                            job_id = %job.id,
                            error = %err,
                            "progress sink failed, continuing to poll"
                        );
                    }
                    match payload.state() {
                        JobState::Succeeded => {
                            tracing::info!(job_id = %job.id, provider = %job.provider, "job succeeded");
                            return Ok(payload.output.unwrap_or(serde_json::Value::Null));
                        }
                        JobState::Failed => {
                            return Err(ProviderError::JobFailed {
                                provider: job.provider.clone(),
                                job_id: job.id.clone(),
                                reason: payload.failure_reason(),
                            });
                        }
                        JobState::Pending | JobState::Running | JobState::Unknown => {}
                    }
                }
                Err(err) => {
                    // Transient fetch errors are a no-op tick; the deadline
                    // bounds how long this can go on.
                    tracing::debug!(
                        job_id = %job.id,
                        provider = %job.provider,
                        error = %err,
                        "status fetch failed, will retry"
                    );
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(self.cancelled(&job));
                }
                _ = sleep(self.poll_interval) => {}
            }
        }
    }

    fn cancelled(&self, job: &Job) -> ProviderError {
        tracing::info!(job_id = %job.id, provider = %job.provider, "polling cancelled");
        ProviderError::Cancelled {
            provider: job.provider.clone(),
            job_id: job.id.clone(),
        }
    }
}
