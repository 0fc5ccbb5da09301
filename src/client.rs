//! HTTP client for the relay
//!
//! Builds the signed request for a flattened prompt, POSTs it to the
//! relay's /ask endpoint, and extracts the generated text from the
//! passthrough completion JSON.

use std::time::Duration;

use serde_json::Value;
use tracing::warn;

use crate::auth::{self, SIGNATURE_HEADER, SignedPayload, TIMESTAMP_HEADER};
use crate::error::{CellmateError, Result};

/// Client for the relay's /ask endpoint
#[derive(Clone)]
pub struct RelayClient {
    client: reqwest::Client,
    /// Base URL without trailing slash, e.g. `http://127.0.0.1:5000`
    base_url: String,
    model: String,
    secret: String,
}

impl RelayClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        secret: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let base: String = base_url.into();
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base.trim_end_matches('/').to_string(),
            model: model.into(),
            secret: secret.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one signed generation request and return the response text.
    ///
    /// A new timestamp and signature are computed per call; reusing a
    /// signature would fail verification once the skew window passes.
    pub async fn ask(&self, prompt: &str, system_prompt: &str) -> Result<String> {
        let payload = SignedPayload {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            system_prompt: system_prompt.to_string(),
        };
        let timestamp = auth::unix_timestamp();
        let signature = auth::sign(&payload, &self.secret, &timestamp)?;

        let response = self
            .client
            .post(format!("{}/ask", self.base_url))
            .header(TIMESTAMP_HEADER, timestamp.as_str())
            .header(SIGNATURE_HEADER, signature.as_str())
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("(failed to read body: {e})"));
            warn!("relay returned {status}: {body}");
            return Err(CellmateError::RelayStatus {
                status: status.as_u16(),
                body,
            });
        }

        let completion: Value = response.json().await?;
        match completion.get("response").and_then(Value::as_str) {
            Some(text) if !text.is_empty() => Ok(text.to_string()),
            _ => Err(CellmateError::EmptyCompletion),
        }
    }
}
