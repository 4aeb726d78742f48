//! Remote generation client.
//!
//! Issues a single `POST {base}/generate` with `{"prompt": ...}`. No retries.
//! Only a connect timeout is configured; a response that never arrives keeps
//! the caller waiting.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::response::{GenerationResponse, error_message, parse_generation_response};
use crate::config::ApiSettings;
use crate::error::{WorkflowError, WorkflowResult};

/// Path of the generation endpoint, relative to the API base
pub const GENERATE_PATH: &str = "generate";

/// Anything that can turn a prompt into a parsed generation response
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> WorkflowResult<GenerationResponse>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

/// HTTP implementation of [`GenerationBackend`]
#[derive(Debug, Clone)]
pub struct HttpGenerationClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpGenerationClient {
    /// Build a client for the configured base address
    pub fn new(settings: &ApiSettings) -> WorkflowResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(settings.connect_timeout))
            .build()
            .map_err(|e| WorkflowError::Transport(e.to_string()))?;
        Self::with_client(client, &settings.base_url)
    }

    /// Build a client around an existing `reqwest::Client`
    pub fn with_client(client: reqwest::Client, base_url: &str) -> WorkflowResult<Self> {
        Ok(Self {
            client,
            endpoint: endpoint_url(base_url)?,
        })
    }
}

#[async_trait]
impl GenerationBackend for HttpGenerationClient {
    async fn generate(&self, prompt: &str) -> WorkflowResult<GenerationResponse> {
        debug!(endpoint = %self.endpoint, "sending generation request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&GenerateRequest { prompt })
            .send()
            .await
            .map_err(|e| WorkflowError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_failure(status.as_u16(), response.bytes().await));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| WorkflowError::Transport(e.to_string()))?;
        parse_generation_response(&body)
    }
}

/// Error for a non-success status; an unreadable body still keeps the status
fn status_failure<B, E>(status: u16, body: Result<B, E>) -> WorkflowError
where
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let message = match body {
        Ok(body) => error_message(body.as_ref()),
        Err(e) => {
            debug!(status, error = %e, "could not read failure body");
            None
        }
    };
    WorkflowError::HttpStatus { status, message }
}

/// Join the base address and the generation path, keeping any base path prefix
pub fn endpoint_url(base_url: &str) -> WorkflowResult<Url> {
    let joined = format!("{}/{}", base_url.trim().trim_end_matches('/'), GENERATE_PATH);
    Url::parse(&joined)
        .map_err(|e| WorkflowError::Transport(format!("invalid API base '{}': {}", base_url, e)))
}
