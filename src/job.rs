//! Job tracking state.
//!
//! A [`Job`] represents one in-flight remote computation. It is owned
//! exclusively by the poller instance driving it and discarded once a
//! terminal status is reached; nothing here is shared across tasks.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::capability::Capability;
use crate::error::ProviderError;
use crate::provider::{JobHandle, JobState, StatusPayload};

/// Lifecycle status of a tracked job.
///
/// Moves forward along `Pending -> Running -> {Succeeded | Failed}`, plus the
/// poller-injected `TimedOut` outcome when the deadline elapses. Never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    TimedOut,
}

impl JobStatus {
    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::TimedOut
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
            JobStatus::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One in-flight remote computation.
#[derive(Debug)]
pub struct Job {
    /// Provider-assigned job id.
    pub id: String,
    pub capability: Capability,
    pub provider: String,
    pub created_at: DateTime<Utc>,
    /// Hard deadline: creation time plus the configured job timeout.
    pub deadline: Instant,
    status: JobStatus,
    /// Last raw status payload observed by the poller.
    pub last_payload: Option<StatusPayload>,
}

impl Job {
    /// Track a freshly queued job with a deadline measured from now.
    pub fn new(handle: &JobHandle, capability: Capability, timeout: Duration) -> Self {
        Self {
            id: handle.job_id.clone(),
            capability,
            provider: handle.provider.clone(),
            created_at: Utc::now(),
            deadline: Instant::now() + timeout,
            status: JobStatus::Pending,
            last_payload: None,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Advance the status, enforcing forward-only transitions.
    pub fn advance(&mut self, target: JobStatus) -> Result<(), ProviderError> {
        if target == self.status {
            return Ok(());
        }
        let legal = match self.status {
            JobStatus::Pending => true,
            JobStatus::Running => target.is_terminal(),
            _ => false,
        };
        if !legal {
            return Err(ProviderError::InvalidTransition {
                job_id: self.id.clone(),
                state: self.status.to_string(),
                target: target.to_string(),
            });
        }
        self.status = target;
        Ok(())
    }

    /// Record a status observation, advancing the tracked status when the
    /// payload maps to a known lifecycle state. Unknown states keep the
    /// current status.
    pub fn observe(&mut self, payload: &StatusPayload) {
        let target = match payload.state() {
            JobState::Pending => Some(JobStatus::Pending),
            JobState::Running => Some(JobStatus::Running),
            JobState::Succeeded => Some(JobStatus::Succeeded),
            JobState::Failed => Some(JobStatus::Failed),
            JobState::Unknown => None,
        };
        if let Some(target) = target {
            if let Err(err) = self.advance(target) {
                tracing::debug!(job_id = %self.id, error = %err, "ignoring backward status report");
            }
        }
        self.last_payload = Some(payload.clone());
    }

    /// True once the hard deadline has elapsed.
    pub fn expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}
