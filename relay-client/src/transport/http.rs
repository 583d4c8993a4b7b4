//! reqwest-backed transport for the relay tunnel.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use relay_types::EncryptedEnvelope;

use super::{Transport, TransportError};

/// Connect timeout applied to every request.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport over HTTP(S) using a pooled reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with the default client settings.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .expect("static reqwest configuration is valid");
        Self { client }
    }

    /// Build a transport around an existing reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn read_json(url: &str, response: reqwest::Response) -> Result<Value, TransportError> {
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::InvalidBody {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    fn connection_error(url: &str, error: reqwest::Error) -> TransportError {
        TransportError::Connection {
            url: url.to_string(),
            reason: error.to_string(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_envelope(
        &self,
        url: &str,
        envelope: &EncryptedEnvelope,
    ) -> Result<Value, TransportError> {
        let response = self
            .client
            .post(url)
            .json(envelope)
            .send()
            .await
            .map_err(|e| Self::connection_error(url, e))?;
        Self::read_json(url, response).await
    }

    async fn fetch_response(&self, url: &str) -> Result<Value, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::connection_error(url, e))?;
        Self::read_json(url, response).await
    }

    async fn fetch_status(&self, url: &str, timeout: Duration) -> Result<Value, TransportError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Self::connection_error(url, e))?;
        Self::read_json(url, response).await
    }
}
