//! RelayClient - send, acknowledge, poll, correlate.
//!
//! One call walks a fixed sequence:
//!
//! ```text
//! SENDING -> ACK_RECEIVED -> POLLING -> MATCHED
//!                               |-----> TIMED_OUT  (client budget spent)
//!                               `-----> CANCELLED  (caller token fired)
//! ```
//!
//! The relay multiplexes every caller onto one response stream, so while
//! POLLING four observations all mean "not my answer yet" and are retried
//! after the interval: a transport error, the relay's own `timeout` marker,
//! an undecryptable payload, and a response correlated to a different
//! request. Only the client-side elapsed budget ends the loop.
//!
//! Failover happens at the send step: a [`TransportError`] from the POST
//! advances to the next configured base URL with the identical encrypted
//! envelope. A poll timeout is end-to-end and is not retried on a fallback;
//! the caller re-invokes with a fresh request id instead.

use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use relay_types::{PollReply, ProtocolError, RequestEnvelope, RequestId, ResponseEnvelope};

use crate::crypto::{CryptoError, EnvelopeKey};
use crate::status::{self, StatusReport};
use crate::transport::{Transport, TransportError};

/// Path of the encrypted request/response endpoint on every relay host.
pub const SECURE_PATH: &str = "/api/secure";

/// Path of the unauthenticated status endpoint.
pub const STATUS_PATH: &str = "/api/status";

const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(45);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
const DEFAULT_STATUS_TIMEOUT: Duration = Duration::from_secs(10);

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Every configured relay URL failed at the send step; this is the last
    /// failure.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Envelope encryption or decryption failed terminally.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Payload or envelope serialization failed.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// No matching response arrived within the polling budget.
    #[error("no response to {request_id} within {timeout:?}")]
    PollTimeout {
        /// The request that went unanswered.
        request_id: RequestId,
        /// The budget that was spent.
        timeout: Duration,
    },

    /// The caller's cancellation token fired.
    #[error("operation cancelled")]
    Cancelled,

    /// The configuration contains no relay URLs.
    #[error("no relay urls configured")]
    NoEndpoints,
}

/// Configuration for [`RelayClient`].
///
/// Deployment topology - URLs, key, timing - is injected here so tests and
/// staging environments can substitute their own endpoints.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Ordered relay base URLs, primary first.
    pub base_urls: Vec<String>,
    /// Pre-shared envelope key.
    pub key: EnvelopeKey,
    /// End-to-end budget for one poll loop.
    pub poll_timeout: Duration,
    /// Delay between poll attempts.
    pub poll_interval: Duration,
    /// Per-request timeout for status probes.
    pub status_timeout: Duration,
}

impl RelayConfig {
    /// Create a configuration with default timing.
    pub fn new(key: EnvelopeKey, base_urls: Vec<String>) -> Self {
        Self {
            base_urls,
            key,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            status_timeout: DEFAULT_STATUS_TIMEOUT,
        }
    }

    /// Set the end-to-end poll budget.
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Set the delay between poll attempts.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the per-request status probe timeout.
    pub fn with_status_timeout(mut self, timeout: Duration) -> Self {
        self.status_timeout = timeout;
        self
    }
}

/// The relay protocol client.
///
/// Encrypts a request envelope, POSTs it to the first reachable relay, then
/// polls the shared response endpoint until the matching response decrypts,
/// the budget runs out, or the caller cancels. Calls share no mutable state;
/// any number may be in flight concurrently on one client.
pub struct RelayClient<T: Transport> {
    config: RelayConfig,
    transport: T,
}

impl<T: Transport> RelayClient<T> {
    /// Create a new client.
    pub fn new(config: RelayConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// The active configuration.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// A reference to the underlying transport (for testing).
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute a request with failover across the configured relay URLs.
    pub async fn execute(&self, request: RequestEnvelope) -> Result<ResponseEnvelope, ClientError> {
        self.execute_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Execute a request, honoring a caller-supplied cancellation token.
    ///
    /// The envelope is encrypted once; a send-step failure re-sends the
    /// identical ciphertext to the next base URL. Exhausting every URL
    /// surfaces the last send error unchanged.
    pub async fn execute_with_cancel(
        &self,
        request: RequestEnvelope,
        cancel: &CancellationToken,
    ) -> Result<ResponseEnvelope, ClientError> {
        let sealed = self.config.key.seal(&request)?;
        let request_id = request.request_id.clone();

        let mut last_send_error = None;
        let total = self.config.base_urls.len();
        for (attempt, base) in self.config.base_urls.iter().enumerate() {
            let url = endpoint_url(base, SECURE_PATH);
            match self.transport.post_envelope(&url, &sealed).await {
                Ok(ack) => {
                    tracing::debug!(
                        request_id = %request_id,
                        url = %url,
                        ack = %ack,
                        "relay acknowledged request"
                    );
                    return self.poll(&url, &request_id, cancel).await;
                }
                Err(e) => {
                    if attempt + 1 < total {
                        tracing::info!(
                            request_id = %request_id,
                            url = %url,
                            error = %e,
                            "send failed, switching to fallback relay"
                        );
                    } else {
                        tracing::warn!(
                            request_id = %request_id,
                            url = %url,
                            error = %e,
                            "send failed on last configured relay"
                        );
                    }
                    last_send_error = Some(e);
                }
            }
        }

        Err(last_send_error
            .map(ClientError::Transport)
            .unwrap_or(ClientError::NoEndpoints))
    }

    /// Poll the shared response endpoint until the matching response arrives.
    async fn poll(
        &self,
        url: &str,
        request_id: &RequestId,
        cancel: &CancellationToken,
    ) -> Result<ResponseEnvelope, ClientError> {
        let deadline = Instant::now() + self.config.poll_timeout;

        loop {
            if cancel.is_cancelled() {
                return Err(ClientError::Cancelled);
            }
            if Instant::now() >= deadline {
                tracing::warn!(
                    request_id = %request_id,
                    timeout = ?self.config.poll_timeout,
                    "poll budget spent without a matching response"
                );
                return Err(ClientError::PollTimeout {
                    request_id: request_id.clone(),
                    timeout: self.config.poll_timeout,
                });
            }

            match self.transport.fetch_response(url).await {
                Err(e) => {
                    tracing::debug!(request_id = %request_id, error = %e, "poll attempt failed, retrying");
                }
                Ok(body) => {
                    let reply = PollReply::from_body(&body);
                    if reply.timeout {
                        tracing::debug!(request_id = %request_id, "relay still processing");
                    } else if let Some(encrypted) = reply.encrypted() {
                        match self.config.key.open(&encrypted) {
                            Ok(response) if response.is_for(request_id) => {
                                tracing::debug!(
                                    request_id = %request_id,
                                    success = response.success,
                                    "matching response received"
                                );
                                return Ok(response);
                            }
                            Ok(other) => {
                                tracing::debug!(
                                    request_id = %request_id,
                                    other = %other.request_id,
                                    "response belongs to a different request, ignoring"
                                );
                            }
                            Err(_) => {
                                tracing::debug!(
                                    request_id = %request_id,
                                    "undecryptable payload on the response stream, ignoring"
                                );
                            }
                        }
                    }
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.poll_interval) => {}
                _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            }
        }
    }

    /// Probe the status endpoint of each configured relay. Never fails; an
    /// unreachable relay reads as offline.
    pub async fn check_status(&self) -> StatusReport {
        status::check(&self.transport, &self.config).await
    }
}

/// Join a base URL and an endpoint path, tolerating trailing slashes.
pub(crate) fn endpoint_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
