//! HTTP client for the local Ollama inference daemon
//!
//! One operation: forward `{model, prompt, stream: false}` to
//! `/api/generate` and hand back whatever JSON the daemon returns, with no
//! schema validation. The daemon is an external collaborator; its own
//! concurrency and model management are not this crate's concern.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{CellmateError, Result};

const GENERATE_PATH: &str = "/api/generate";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Client for Ollama's generation endpoint
#[derive(Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    /// Base URL without trailing slash, e.g. `http://localhost:11434`
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base: String = base_url.into();
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run a non-streaming generation and return the daemon's JSON verbatim
    pub async fn generate(&self, model: &str, prompt: &str) -> Result<Value> {
        let body = GenerateRequest {
            model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}{}", self.base_url, GENERATE_PATH))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|e| format!("(failed to read body: {e})"));
            warn!("daemon returned {status}: {text}");
            return Err(CellmateError::DaemonStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(response.json().await?)
    }

    /// Cheap reachability check for the status endpoint. Any HTTP response
    /// means the daemon is up; only connect errors and timeouts count as
    /// unreachable.
    pub async fn is_reachable(&self) -> bool {
        match self
            .client
            .get(format!("{}/", self.base_url))
            .timeout(Duration::from_secs(2))
            .send()
            .await
        {
            Ok(_) => true,
            Err(e) => !(e.is_connect() || e.is_timeout()),
        }
    }
}
