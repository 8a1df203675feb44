//! Throttled progress notifications.
//!
//! Converts heterogeneous provider progress signals into a bounded stream of
//! user-visible updates: at most one message per configured interval, or more
//! often only when progress advances by a meaningful delta. Delivery is
//! strictly best-effort; a notification failure is never the reason a job
//! fails.

mod percent;
mod transport;

pub use percent::extract_percent;
pub use transport::{MessageHandle, Transport};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::TransportError;
use crate::provider::StatusPayload;

/// Receives raw status payloads once per poll tick.
///
/// The poller treats sink errors as best-effort: they are logged and polling
/// continues.
#[async_trait]
pub trait ProgressSink: Send {
    async fn on_status(&mut self, payload: &StatusPayload) -> Result<(), TransportError>;
}

/// No-op sink for callers that don't want progress messages.
pub struct SilentSink;

#[async_trait]
impl ProgressSink for SilentSink {
    async fn on_status(&mut self, _payload: &StatusPayload) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Throttle thresholds for one notifier.
#[derive(Debug, Clone, Copy)]
pub struct NotifyPolicy {
    /// Minimum percent advance that triggers an immediate update.
    pub min_delta: u8,
    /// Minimum time between updates when percent is not advancing.
    pub min_interval: Duration,
}

impl Default for NotifyPolicy {
    fn default() -> Self {
        Self {
            min_delta: 5,
            min_interval: Duration::from_millis(15_000),
        }
    }
}

/// Per-job throttled progress notifier.
///
/// Owned by the task driving one job; state is never shared. The first
/// emission sends a new message and records its handle; later emissions edit
/// that message in place, falling back to a fresh message when the edit fails.
pub struct ProgressNotifier {
    transport: Arc<dyn Transport>,
    policy: NotifyPolicy,
    /// Short description used in message text, e.g. "text-to-image on replicate".
    label: String,
    last_percent: Option<u8>,
    last_emit: Instant,
    message: Option<MessageHandle>,
}

impl ProgressNotifier {
    pub fn new(
        transport: Arc<dyn Transport>,
        policy: NotifyPolicy,
        label: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            policy,
            label: label.into(),
            last_percent: None,
            last_emit: Instant::now(),
            message: None,
        }
    }

    /// Percent of the last emitted update, once one carried a known value.
    pub fn last_percent(&self) -> Option<u8> {
        self.last_percent
    }

    fn should_emit(&self, percent: Option<u8>, now: Instant) -> bool {
        if let Some(current) = percent {
            match self.last_percent {
                // First known percent is always worth showing
                None => return true,
                Some(previous) if current >= previous.saturating_add(self.policy.min_delta) => {
                    return true;
                }
                Some(_) => {}
            }
        }
        now.duration_since(self.last_emit) >= self.policy.min_interval
    }

    fn render(&self, percent: Option<u8>) -> String {
        match percent {
            Some(p) => format!("⏳ {}: {p}% complete", self.label),
            None => format!("⏳ {}: still processing…", self.label),
        }
    }

    /// Edit the tracked message, or send a new one when there is none yet or
    /// the edit fails (message deleted, too old, transport hiccup).
    async fn deliver(&mut self, text: &str) -> Result<(), TransportError> {
        if let Some(handle) = self.message.clone() {
            match self.transport.edit_message(&handle, text).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    tracing::debug!(error = %err, "message edit failed, sending a new message");
                }
            }
        }
        let handle = self.transport.send_message(text).await?;
        self.message = Some(handle);
        Ok(())
    }
}

#[async_trait]
impl ProgressSink for ProgressNotifier {
    async fn on_status(&mut self, payload: &StatusPayload) -> Result<(), TransportError> {
        let now = Instant::now();
        let sampled = extract_percent(payload);

        // Emitted percents never decrease: a stale lower sample is clamped to
        // the running maximum, and unknown samples leave it untouched.
        let effective = match (sampled, self.last_percent) {
            (Some(current), Some(previous)) => Some(current.max(previous)),
            (Some(current), None) => Some(current),
            (None, _) => None,
        };

        if !self.should_emit(effective, now) {
            return Ok(());
        }

        let text = self.render(effective.or(self.last_percent));
        match self.deliver(&text).await {
            Ok(()) => {
                self.last_emit = now;
                if let Some(percent) = effective {
                    self.last_percent = Some(percent);
                }
            }
            Err(err) => {
                // Progress reporting is best-effort; throttle state is left
                // untouched so the next tick retries.
                tracing::warn!(error = %err, "progress notification failed");
            }
        }
        Ok(())
    }
}
