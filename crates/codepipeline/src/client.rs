//! HTTP client for the pipeline execution service.

use std::time::Duration;

use async_trait::async_trait;
use dispatch::{ExecutionId, IdempotencyToken, PipelineName, PipelineStarter, StartExecutionError};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Longest error message copied from a service response body.
const MAX_ERROR_MESSAGE_LEN: usize = 512;

// ============================================================================
// Configuration
// ============================================================================

/// Connection settings for the pipeline execution service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineServiceConfig {
    /// Base URL; `/pipelines/{name}/executions` is appended to its path.
    pub base_url: String,
    /// Deadline for each start-execution request, including reading the body.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl PipelineServiceConfig {
    /// Default request deadline.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Self::DEFAULT_TIMEOUT,
            user_agent: concat!("pushgate/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Errors raised while constructing an [`HttpPipelineStarter`].
#[derive(Debug, Error)]
pub enum PipelineServiceError {
    #[error("invalid pipeline service URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartExecutionRequest {
    client_request_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartExecutionResponse {
    pipeline_execution_id: String,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    message: Option<String>,
}

// ============================================================================
// HttpPipelineStarter
// ============================================================================

/// [`PipelineStarter`] backed by the pipeline service's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpPipelineStarter {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpPipelineStarter {
    /// Creates a starter for the service at `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineServiceError::InvalidBaseUrl`] if the URL does not
    /// parse or cannot carry a path, and [`PipelineServiceError::Client`] if
    /// the HTTP client cannot be built.
    pub fn new(config: PipelineServiceConfig) -> Result<Self, PipelineServiceError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            PipelineServiceError::InvalidBaseUrl { url: config.base_url.clone(), reason: e.to_string() }
        })?;
        if base_url.cannot_be_a_base() {
            return Err(PipelineServiceError::InvalidBaseUrl {
                url: config.base_url,
                reason: "URL cannot carry a path".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()?;

        Ok(Self { client, base_url, timeout: config.timeout })
    }

    fn execution_url(&self, pipeline: &PipelineName) -> Result<Url, StartExecutionError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| StartExecutionError::Transport {
                message: format!("base URL '{}' cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(["pipelines", pipeline.as_str(), "executions"]);
        Ok(url)
    }

    fn classify_send_error(&self, err: reqwest::Error) -> StartExecutionError {
        if err.is_timeout() {
            StartExecutionError::Timeout { timeout: self.timeout }
        } else {
            StartExecutionError::Transport { message: err.to_string() }
        }
    }
}

#[async_trait]
impl PipelineStarter for HttpPipelineStarter {
    #[instrument(skip(self), fields(pipeline = %pipeline, token = %token))]
    async fn start_execution(
        &self,
        pipeline: &PipelineName,
        token: IdempotencyToken,
    ) -> Result<ExecutionId, StartExecutionError> {
        let url = self.execution_url(pipeline)?;
        debug!(url = %url, "Starting pipeline execution");

        let response = self
            .client
            .post(url)
            .json(&StartExecutionRequest { client_request_token: token.to_string() })
            .send()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Pipeline service rejected start request");
            return Err(classify_status(status, pipeline, &body));
        }

        let body: StartExecutionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                StartExecutionError::Timeout { timeout: self.timeout }
            } else {
                StartExecutionError::InvalidResponse { message: e.to_string() }
            }
        })?;

        ExecutionId::new(body.pipeline_execution_id).ok_or_else(|| {
            StartExecutionError::InvalidResponse { message: "empty pipelineExecutionId".to_string() }
        })
    }
}

// ============================================================================
// Error classification
// ============================================================================

fn classify_status(status: StatusCode, pipeline: &PipelineName, body: &str) -> StartExecutionError {
    let message = error_message(status, body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            StartExecutionError::Unauthorized { message }
        }
        StatusCode::NOT_FOUND => StartExecutionError::PipelineNotFound { pipeline: pipeline.to_string() },
        StatusCode::TOO_MANY_REQUESTS => StartExecutionError::Throttled { message },
        other => StartExecutionError::Service { status: other.as_u16(), message },
    }
}

/// Human-readable message for a failed response: the JSON `message` field if
/// present, else the raw body, else the status reason. Truncated.
fn error_message(status: StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<ServiceErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| body.trim().to_string());

    if message.is_empty() {
        return status.canonical_reason().unwrap_or("unknown error").to_string();
    }
    match message.char_indices().nth(MAX_ERROR_MESSAGE_LEN) {
        Some((cut, _)) => format!("{}...", &message[..cut]),
        None => message,
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
