//! Generic JSON-over-HTTP provider client.
//!
//! Speaks a minimal job API: `POST {base}/v1/jobs` to submit, `GET
//! {base}/v1/jobs/{id}` for status. A submit response carrying an `output`
//! field is treated as a synchronous result; one carrying an `id` as a queued
//! job. Providers with other wire shapes implement [`Provider`] directly.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;

use crate::capability::Capability;
use crate::config::HttpProviderConfig;
use crate::error::ProviderError;
use crate::provider::{JobHandle, Provider, StatusPayload, Submission};

/// Provider client over a JSON job-submission API.
pub struct HttpProvider {
    name: String,
    config: HttpProviderConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    output: Option<Value>,
}

impl HttpProvider {
    pub fn new(name: impl Into<String>, config: HttpProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            name: name.into(),
            config,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.bearer_auth(key.expose_secret()),
            None => request,
        }
    }

    fn unavailable(&self, reason: impl Into<String>) -> ProviderError {
        ProviderError::Unavailable {
            provider: self.name.clone(),
            reason: reason.into(),
        }
    }

    fn invalid_response(&self, reason: impl Into<String>) -> ProviderError {
        ProviderError::InvalidResponse {
            provider: self.name.clone(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Provider for HttpProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn submit(
        &self,
        capability: Capability,
        input: Value,
    ) -> Result<Submission, ProviderError> {
        let url = self.url("v1/jobs");
        let body = serde_json::json!({
            "capability": capability,
            "input": input,
        });

        let response = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.unavailable(format!("HTTP {status} from {url}")));
        }

        let parsed: SubmitResponse = response
            .json()
            .await
            .map_err(|e| self.invalid_response(e.to_string()))?;

        if let Some(output) = parsed.output {
            return Ok(Submission::Completed(output));
        }
        match parsed.id {
            Some(id) => Ok(Submission::Queued(JobHandle::new(&self.name, id))),
            None => Err(self.invalid_response("submit response carried neither output nor id")),
        }
    }

    async fn fetch_status(&self, handle: &JobHandle) -> Result<StatusPayload, ProviderError> {
        let url = self.url(&format!("v1/jobs/{}", handle.job_id));

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| self.unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.unavailable(format!("HTTP {status} from {url}")));
        }

        response
            .json()
            .await
            .map_err(|e| self.invalid_response(e.to_string()))
    }
}
