//! Provider status payloads.
//!
//! Payloads are provider-specific and opaque beyond three readable fields the
//! core interprets: a status string, an optional numeric progress indicator
//! (direct or nested under a metrics block), and an optional list of log
//! lines. Everything else is retained in `extra` untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Coarse lifecycle state a provider reports for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed,
    /// Status string not recognized; the poller keeps polling.
    Unknown,
}

/// Nested metrics block some providers attach to status payloads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
}

/// One raw status observation for a queued job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusPayload {
    /// Provider-reported status string (e.g. "running", "succeeded").
    #[serde(default)]
    pub status: String,
    /// Direct numeric progress indicator. Values at or below 1.0 are
    /// fractions, larger values are percentages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    /// Metrics-style nested progress, used when `progress` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<JobMetrics>,
    /// Free-text log lines, most recent last.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<String>,
    /// Result payload, present once the job succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// Failure detail, present when the job failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Provider-specific fields carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl StatusPayload {
    /// Map the raw status string onto the coarse lifecycle state.
    pub fn state(&self) -> JobState {
        match self.status.to_ascii_lowercase().as_str() {
            "pending" | "queued" | "submitted" | "starting" => JobState::Pending,
            "running" | "processing" | "in_progress" => JobState::Running,
            "succeeded" | "completed" | "success" | "done" => JobState::Succeeded,
            "failed" | "error" | "canceled" | "cancelled" => JobState::Failed,
            _ => JobState::Unknown,
        }
    }

    /// Most recent log line, if any.
    pub fn last_log(&self) -> Option<&str> {
        self.logs.last().map(String::as_str)
    }

    /// Human-readable failure reason, preferring the explicit error field.
    pub fn failure_reason(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.last_log().map(str::to_string))
            .unwrap_or_else(|| self.status.clone())
    }
}
