//! Async job orchestration for conversational assistants.
//!
//! A front end asks for a [`Capability`] (chat completion, text-to-image,
//! ...); the [`FallbackChain`] tries configured provider candidates in
//! priority order. Synchronous results return immediately; job-based
//! providers hand back a handle the [`JobPoller`](poller::JobPoller) drives
//! to a terminal state under a hard deadline, streaming each raw status into
//! a [`ProgressNotifier`](notify::ProgressNotifier) that keeps the requester
//! informed without flooding them.
//!
//! The conversational transport and the provider wire formats live outside
//! this crate, behind the [`Transport`](notify::Transport) and
//! [`Provider`](provider::Provider) traits. Jobs are not persisted across
//! restarts and progress delivery is best-effort by design.

pub mod capability;
pub mod chain;
pub mod config;
pub mod error;
pub mod job;
pub mod notify;
pub mod observability;
pub mod poller;
pub mod provider;

pub use capability::Capability;
pub use chain::{ChainResult, FallbackChain, FallbackChainBuilder, ProviderCandidate};
pub use config::{HttpProviderConfig, OrchestratorConfig};
pub use error::{ChainError, ConfigError, Error, ProviderError, Result, TransportError};
pub use job::{Job, JobStatus};
pub use notify::{
    extract_percent, MessageHandle, NotifyPolicy, ProgressNotifier, ProgressSink, SilentSink,
    Transport,
};
pub use poller::JobPoller;
pub use provider::{
    HttpProvider, JobHandle, JobMetrics, JobState, Provider, StatusPayload, Submission,
};
