//! Transport abstraction for the relay tunnel.
//!
//! The relay speaks plain HTTPS: a POST of the encrypted envelope to the
//! secure endpoint, repeated GETs against the shared response endpoint while
//! polling, and an unauthenticated GET against the status endpoint. The trait
//! exists so client logic runs against [`MockTransport`] in tests and real
//! endpoints can be substituted through configuration.

mod http;
mod mock;

pub use http::HttpTransport;
pub use mock::MockTransport;

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use relay_types::EncryptedEnvelope;

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never reached the endpoint (DNS, TLS, connect, ...).
    #[error("connection to {url} failed: {reason}")]
    Connection {
        /// Endpoint that was attempted.
        url: String,
        /// Underlying failure description.
        reason: String,
    },

    /// The endpoint answered with a non-2xx status.
    #[error("http status {status} from {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Endpoint that answered.
        url: String,
    },

    /// The response body could not be read or was not JSON.
    #[error("invalid response body from {url}: {reason}")]
    InvalidBody {
        /// Endpoint that answered.
        url: String,
        /// Underlying failure description.
        reason: String,
    },
}

/// HTTP operations the relay client needs.
///
/// One attempt per call - retries, failover and timeouts are decided by the
/// caller, never inside a transport implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST an encrypted envelope to a secure endpoint.
    ///
    /// Returns the relay's acknowledgment body: a receipt, not the result.
    async fn post_envelope(
        &self,
        url: &str,
        envelope: &EncryptedEnvelope,
    ) -> Result<Value, TransportError>;

    /// GET one candidate body from a shared response endpoint.
    async fn fetch_response(&self, url: &str) -> Result<Value, TransportError>;

    /// GET a plain status endpoint with a per-request timeout.
    async fn fetch_status(&self, url: &str, timeout: Duration) -> Result<Value, TransportError>;
}
