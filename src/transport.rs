//! Single-attempt delivery of a payload to the provider.
//!
//! A [`Transport`] performs exactly one request and reports either the HTTP
//! status with its body, or a transport-level error. Retrying is the
//! dispatcher's job.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::Config;
use crate::request::Payload;
use crate::{mlog_trace, Error, Result};

/// Status and body of one provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    pub status: u16,
    pub body: String,
}

impl ProviderResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request. Errors are `Error::Transport` or `Error::Timeout`.
    async fn send(&self, payload: &Payload) -> Result<ProviderResponse>;
}

/// `generateContent` over HTTPS with the API key as a query parameter.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    api_key: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(endpoint: &str, model: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: generate_content_url(endpoint, model),
            api_key: api_key.to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.effective_endpoint(),
            config.effective_model(),
            config.effective_api_key()?,
            config.request_timeout(),
        )
    }

    /// Request URL without the credential.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn map_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout(self.timeout)
        } else {
            // Strip the URL so the API key never reaches logs.
            Error::Transport(err.without_url().to_string())
        }
    }
}

pub fn generate_content_url(endpoint: &str, model: &str) -> String {
    format!(
        "{}/models/{}:generateContent",
        endpoint.trim_end_matches('/'),
        model
    )
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, payload: &Payload) -> Result<ProviderResponse> {
        mlog_trace!(
            "POST {} body={}",
            self.url,
            serde_json::to_string(payload).unwrap_or_default()
        );
        let response = self
            .client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(payload)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.map_error(e))?;
        mlog_trace!("Response status={} body={}", status, body);
        Ok(ProviderResponse { status, body })
    }
}
