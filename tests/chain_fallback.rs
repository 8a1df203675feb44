//! End-to-end fallback chain scenarios: async providers driven through the
//! poller and notifier, with a recording transport standing in for the chat
//! channel.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use genflow::{
    Capability, ChainError, FallbackChain, JobHandle, MessageHandle, OrchestratorConfig, Provider,
    ProviderError, StatusPayload, Submission, Transport, TransportError,
};

/// Provider with a scripted submit result and status sequence. The final
/// status repeats once the script is exhausted.
struct ScriptedProvider {
    name: String,
    submit: Mutex<Option<Result<Submission, ProviderError>>>,
    statuses: Mutex<VecDeque<StatusPayload>>,
}

impl ScriptedProvider {
    fn sync(name: &str, output: serde_json::Value) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            submit: Mutex::new(Some(Ok(Submission::Completed(output)))),
            statuses: Mutex::new(VecDeque::new()),
        })
    }

    fn unavailable(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            submit: Mutex::new(Some(Err(ProviderError::Unavailable {
                provider: name.to_string(),
                reason: "connect timeout".to_string(),
            }))),
            statuses: Mutex::new(VecDeque::new()),
        })
    }

    fn queued(name: &str, statuses: Vec<StatusPayload>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            submit: Mutex::new(Some(Ok(Submission::Queued(JobHandle::new(name, "job-1"))))),
            statuses: Mutex::new(statuses.into()),
        })
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn submit(
        &self,
        _capability: Capability,
        _input: serde_json::Value,
    ) -> Result<Submission, ProviderError> {
        self.submit
            .lock()
            .unwrap()
            .take()
            .expect("submit called more than once per execute")
    }

    async fn fetch_status(&self, _handle: &JobHandle) -> Result<StatusPayload, ProviderError> {
        let mut statuses = self.statuses.lock().unwrap();
        match statuses.len() {
            0 => Ok(running(None)),
            1 => Ok(statuses.front().cloned().unwrap()),
            _ => Ok(statuses.pop_front().unwrap()),
        }
    }
}

/// Transport recording every message it delivers.
#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<String>>,
    edits: Mutex<Vec<String>>,
}

impl RecordingTransport {
    fn emissions(&self) -> usize {
        self.sent.lock().unwrap().len() + self.edits.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_message(&self, text: &str) -> Result<MessageHandle, TransportError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(text.to_string());
        Ok(MessageHandle(format!("msg-{}", sent.len())))
    }

    async fn edit_message(
        &self,
        _handle: &MessageHandle,
        text: &str,
    ) -> Result<(), TransportError> {
        self.edits.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

fn running(progress: Option<f64>) -> StatusPayload {
    StatusPayload {
        status: "running".to_string(),
        progress,
        ..Default::default()
    }
}

fn succeeded(output: serde_json::Value) -> StatusPayload {
    StatusPayload {
        status: "succeeded".to_string(),
        output: Some(output),
        ..Default::default()
    }
}

fn failed(reason: &str) -> StatusPayload {
    StatusPayload {
        status: "failed".to_string(),
        error: Some(reason.to_string()),
        ..Default::default()
    }
}

fn config(deadline_secs: u64) -> OrchestratorConfig {
    OrchestratorConfig {
        poll_interval: Duration::from_secs(3),
        job_deadline: Duration::from_secs(deadline_secs),
        ..Default::default()
    }
}

// Spec scenario: candidate A is async and outlives its 2s deadline, candidate
// B answers "hello" synchronously. The chain returns "hello"; A's timeout is
// logged, not surfaced.
#[tokio::test(start_paused = true)]
async fn async_timeout_then_sync_fallback_returns_hello() {
    let transport = Arc::new(RecordingTransport::default());
    let chain = FallbackChain::builder(config(2))
        .provider(
            Capability::ChatCompletion,
            ScriptedProvider::queued("slow", vec![]) as Arc<dyn Provider>,
        )
        .provider(
            Capability::ChatCompletion,
            ScriptedProvider::sync("quick", serde_json::json!("hello")) as Arc<dyn Provider>,
        )
        .build();

    let result = chain
        .execute(
            Capability::ChatCompletion,
            serde_json::json!({"prompt": "greet me"}),
            transport,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(result.output, serde_json::json!("hello"));
    assert_eq!(result.provider, "quick");
    assert_eq!(result.failed_attempts, 1);
}

// A job that fails on the first provider falls through; the progress messages
// already sent for it are left alone.
#[tokio::test(start_paused = true)]
async fn failed_job_falls_through_and_keeps_prior_progress_messages() {
    let transport = Arc::new(RecordingTransport::default());
    let chain = FallbackChain::builder(config(600))
        .provider(
            Capability::TextToImage,
            ScriptedProvider::queued(
                "flaky-diffusion",
                vec![running(Some(0.3)), failed("NSFW filter tripped")],
            ) as Arc<dyn Provider>,
        )
        .provider(
            Capability::TextToImage,
            ScriptedProvider::queued(
                "steady-diffusion",
                vec![
                    running(Some(0.5)),
                    succeeded(serde_json::json!({"url": "https://img/1.png"})),
                ],
            ) as Arc<dyn Provider>,
        )
        .build();

    let result = chain
        .execute(
            Capability::TextToImage,
            serde_json::json!({"prompt": "a lighthouse"}),
            Arc::clone(&transport) as Arc<dyn Transport>,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(result.output["url"], "https://img/1.png");
    assert_eq!(result.provider, "steady-diffusion");
    assert_eq!(result.failed_attempts, 1);

    // The abandoned candidate's 30% message is still there, plus the winning
    // candidate's 50% message.
    assert!(transport.emissions() >= 2);
    let sent = transport.sent.lock().unwrap();
    assert!(sent.iter().any(|t| t.contains("30%")), "sent: {sent:?}");
}

// A long quiet job produces a bounded stream of updates: one roughly every
// 15 seconds when no progress signal is available.
#[tokio::test(start_paused = true)]
async fn quiet_job_notifications_are_time_bounded() {
    let transport = Arc::new(RecordingTransport::default());

    // ~60s of "running" with no progress, then success. Poll ticks land at
    // t = 0, 3, ..., 60; time triggers fire at 15, 30, 45 and 60.
    let mut statuses: Vec<StatusPayload> = (0..20).map(|_| running(None)).collect();
    statuses.push(succeeded(serde_json::json!("done")));

    let chain = FallbackChain::builder(config(600))
        .provider(
            Capability::TextToVideo,
            ScriptedProvider::queued("renderer", statuses) as Arc<dyn Provider>,
        )
        .build();

    let result = chain
        .execute(
            Capability::TextToVideo,
            serde_json::json!({"prompt": "waves"}),
            Arc::clone(&transport) as Arc<dyn Transport>,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(result.output, serde_json::json!("done"));
    let emissions = transport.emissions();
    assert!(
        (3..=5).contains(&emissions),
        "expected ~4 notifications for a 60s quiet job, got {emissions}"
    );
}

// All candidates failing surfaces a single aggregate error with the last
// underlying failure attached.
#[tokio::test(start_paused = true)]
async fn exhausted_chain_reports_aggregate_failure() {
    let transport = Arc::new(RecordingTransport::default());
    let chain = FallbackChain::builder(config(2))
        .provider(
            Capability::TextToSpeech,
            ScriptedProvider::unavailable("tts-a") as Arc<dyn Provider>,
        )
        .provider(
            Capability::TextToSpeech,
            ScriptedProvider::queued("tts-b", vec![]) as Arc<dyn Provider>,
        )
        .build();

    let err = chain
        .execute(
            Capability::TextToSpeech,
            serde_json::json!({"text": "read this"}),
            transport,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    match err {
        ChainError::AllProvidersFailed {
            capability,
            attempts,
            last,
        } => {
            assert_eq!(capability, Capability::TextToSpeech);
            assert_eq!(attempts, 2);
            assert!(matches!(last, ProviderError::JobTimedOut { .. }), "{last:?}");
        }
        other => panic!("expected AllProvidersFailed, got: {other:?}"),
    }
}
