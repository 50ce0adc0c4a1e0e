// Gemini API client - the reqwest-backed upstream for the relay

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};

use crate::proxy::relay::{Upstream, UpstreamOutcome};

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http_client: reqwest::Client,
}

impl GeminiClient {
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::new(),
        }
    }

    /// `None` keeps reqwest's default (no overall timeout).
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http_client: builder.build()?,
        })
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Upstream for GeminiClient {
    async fn post_json(&self, url: &str, body: Bytes) -> UpstreamOutcome {
        let response = self
            .http_client
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .body(body)
            .send()
            .await;

        // reqwest errors embed the request URL, which carries the key.
        let response = match response {
            Ok(response) => response,
            Err(e) => {
                return UpstreamOutcome::Transport(format!("HTTP request failed: {}", e.without_url()))
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return UpstreamOutcome::Failure {
                status: status.as_u16(),
                body,
            };
        }

        match response.bytes().await {
            Ok(body) => UpstreamOutcome::Success(body),
            Err(e) => UpstreamOutcome::Transport(format!(
                "Failed to read upstream body: {}",
                e.without_url()
            )),
        }
    }
}
