//! Mock transport for testing.
//!
//! Allows queueing poll and status bodies, forcing failures per URL, and
//! capturing sent envelopes for verification.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use relay_types::{EncryptedEnvelope, ResponseEnvelope};

use crate::crypto::EnvelopeKey;

use super::{Transport, TransportError};

/// Mock transport for testing.
///
/// Clones share state, so a test can keep a handle while the client owns
/// another.
#[derive(Debug, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Default)]
struct MockTransportInner {
    sent: Vec<(String, EncryptedEnvelope)>,
    ack_body: Option<Value>,
    poll_bodies: VecDeque<Value>,
    polled_urls: Vec<String>,
    status_bodies: VecDeque<Value>,
    status_urls: Vec<String>,
    fail_next_send: Option<String>,
    fail_next_poll: Option<String>,
    send_failures: Vec<(String, String)>,
    status_failures: Vec<(String, String)>,
    echo_key: Option<EnvelopeKey>,
}

impl std::fmt::Debug for MockTransportInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransportInner")
            .field("sent", &self.sent.len())
            .field("poll_bodies", &self.poll_bodies.len())
            .field("status_bodies", &self.status_bodies.len())
            .finish()
    }
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a body to be returned by a future `fetch_response()` call.
    ///
    /// With the queue drained, polls return the relay's "still processing"
    /// marker, so an un-answered call keeps polling until its budget runs out.
    pub fn queue_poll_body(&self, body: Value) {
        self.inner.lock().unwrap().poll_bodies.push_back(body);
    }

    /// Queue a body to be returned by a future `fetch_status()` call.
    pub fn queue_status_body(&self, body: Value) {
        self.inner.lock().unwrap().status_bodies.push_back(body);
    }

    /// Override the acknowledgment body returned from `post_envelope()`.
    pub fn set_ack_body(&self, body: Value) {
        self.inner.lock().unwrap().ack_body = Some(body);
    }

    /// Answer every poll with a sealed success response echoing the request
    /// id of the most recently sent envelope.
    pub fn respond_with_success(&self, key: EnvelopeKey) {
        self.inner.lock().unwrap().echo_key = Some(key);
    }

    /// Cause the next `post_envelope()` to fail with the given reason.
    pub fn fail_next_send(&self, reason: &str) {
        self.inner.lock().unwrap().fail_next_send = Some(reason.to_string());
    }

    /// Cause the next `fetch_response()` to fail with the given reason.
    pub fn fail_next_poll(&self, reason: &str) {
        self.inner.lock().unwrap().fail_next_poll = Some(reason.to_string());
    }

    /// Cause every `post_envelope()` whose URL contains `fragment` to fail.
    pub fn fail_sends_matching(&self, fragment: &str, reason: &str) {
        self.inner
            .lock()
            .unwrap()
            .send_failures
            .push((fragment.to_string(), reason.to_string()));
    }

    /// Cause every `fetch_status()` whose URL contains `fragment` to fail.
    pub fn fail_status_matching(&self, fragment: &str, reason: &str) {
        self.inner
            .lock()
            .unwrap()
            .status_failures
            .push((fragment.to_string(), reason.to_string()));
    }

    /// All envelopes that were sent, with their target URLs.
    pub fn sent(&self) -> Vec<(String, EncryptedEnvelope)> {
        self.inner.lock().unwrap().sent.clone()
    }

    /// The most recently sent envelope.
    pub fn last_sent(&self) -> Option<(String, EncryptedEnvelope)> {
        self.inner.lock().unwrap().sent.last().cloned()
    }

    /// URLs hit by `fetch_response()`, in order.
    pub fn polled_urls(&self) -> Vec<String> {
        self.inner.lock().unwrap().polled_urls.clone()
    }

    /// URLs hit by `fetch_status()`, in order.
    pub fn status_urls(&self) -> Vec<String> {
        self.inner.lock().unwrap().status_urls.clone()
    }

    /// Clear all state.
    pub fn reset(&self) {
        *self.inner.lock().unwrap() = MockTransportInner::default();
    }

    fn echo_body(inner: &MockTransportInner) -> Option<Value> {
        let key = inner.echo_key.as_ref()?;
        let (_, envelope) = inner.sent.last()?;
        let request = key.open_json(envelope).ok()?;
        let request_id = request.get("request_id")?.as_str()?;

        let response = ResponseEnvelope {
            request_id: relay_types::RequestId::from_string(request_id),
            success: true,
            data: Some(json!({"echo": true})),
            message: None,
        };
        let sealed = key
            .seal_json(&serde_json::to_value(&response).ok()?)
            .ok()?;
        serde_json::to_value(&sealed).ok()
    }
}

impl Clone for MockTransport {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post_envelope(
        &self,
        url: &str,
        envelope: &EncryptedEnvelope,
    ) -> Result<Value, TransportError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(reason) = inner.fail_next_send.take() {
            return Err(TransportError::Connection {
                url: url.to_string(),
                reason,
            });
        }
        if let Some((_, reason)) = inner
            .send_failures
            .iter()
            .find(|(fragment, _)| url.contains(fragment))
        {
            return Err(TransportError::Connection {
                url: url.to_string(),
                reason: reason.clone(),
            });
        }

        inner.sent.push((url.to_string(), envelope.clone()));
        Ok(inner.ack_body.clone().unwrap_or_else(|| json!({"received": true})))
    }

    async fn fetch_response(&self, url: &str) -> Result<Value, TransportError> {
        let mut inner = self.inner.lock().unwrap();
        inner.polled_urls.push(url.to_string());

        if let Some(reason) = inner.fail_next_poll.take() {
            return Err(TransportError::Connection {
                url: url.to_string(),
                reason,
            });
        }
        if let Some(body) = inner.poll_bodies.pop_front() {
            return Ok(body);
        }
        if let Some(body) = Self::echo_body(&inner) {
            return Ok(body);
        }
        Ok(json!({"timeout": true}))
    }

    async fn fetch_status(&self, url: &str, _timeout: Duration) -> Result<Value, TransportError> {
        let mut inner = self.inner.lock().unwrap();
        inner.status_urls.push(url.to_string());

        if let Some((_, reason)) = inner
            .status_failures
            .iter()
            .find(|(fragment, _)| url.contains(fragment))
        {
            return Err(TransportError::Connection {
                url: url.to_string(),
                reason: reason.clone(),
            });
        }
        inner
            .status_bodies
            .pop_front()
            .ok_or_else(|| TransportError::Connection {
                url: url.to_string(),
                reason: "no status body queued".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope() -> EncryptedEnvelope {
        EncryptedEnvelope {
            data: "Y2lwaGVy".into(),
            iv: "aXY=".into(),
        }
    }

    #[tokio::test]
    async fn records_sent_envelopes() {
        let transport = MockTransport::new();

        transport
            .post_envelope("https://relay.test/api/secure", &envelope())
            .await
            .unwrap();

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "https://relay.test/api/secure");
    }

    #[tokio::test]
    async fn drained_poll_queue_returns_processing_marker() {
        let transport = MockTransport::new();
        transport.queue_poll_body(json!({"data": "x", "iv": "y"}));

        let first = transport.fetch_response("https://relay.test/api/secure").await.unwrap();
        let second = transport.fetch_response("https://relay.test/api/secure").await.unwrap();

        assert_eq!(first["data"], "x");
        assert_eq!(second, json!({"timeout": true}));
    }

    #[tokio::test]
    async fn forced_send_failure_is_one_shot() {
        let transport = MockTransport::new();
        transport.fail_next_send("tunnel down");

        let first = transport.post_envelope("https://relay.test", &envelope()).await;
        assert!(matches!(first, Err(TransportError::Connection { .. })));

        transport.post_envelope("https://relay.test", &envelope()).await.unwrap();
    }

    #[tokio::test]
    async fn url_matched_send_failures_persist() {
        let transport = MockTransport::new();
        transport.fail_sends_matching("primary", "connection refused");

        for _ in 0..2 {
            let result = transport
                .post_envelope("https://primary.test/api/secure", &envelope())
                .await;
            assert!(result.is_err());
        }
        transport
            .post_envelope("https://fallback.test/api/secure", &envelope())
            .await
            .unwrap();

        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn status_failures_match_by_url() {
        let transport = MockTransport::new();
        transport.fail_status_matching("primary", "timed out");
        transport.queue_status_body(json!({"online": true}));

        let timeout = Duration::from_secs(10);
        assert!(transport
            .fetch_status("https://primary.test/api/status", timeout)
            .await
            .is_err());
        assert!(transport
            .fetch_status("https://fallback.test/api/status", timeout)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn echo_mode_answers_with_matching_request_id() {
        let key = EnvelopeKey::random();
        let transport = MockTransport::new();
        transport.respond_with_success(key.clone());

        let request = relay_types::RequestEnvelope::new(
            "/api/health",
            relay_types::Method::Get,
            json!({}),
        );
        let sealed = key.seal(&request).unwrap();
        transport
            .post_envelope("https://relay.test/api/secure", &sealed)
            .await
            .unwrap();

        let body = transport
            .fetch_response("https://relay.test/api/secure")
            .await
            .unwrap();
        let reply: EncryptedEnvelope = serde_json::from_value(body).unwrap();
        let response = key.open(&reply).unwrap();

        assert!(response.success);
        assert!(response.is_for(&request.request_id));
    }

    #[tokio::test]
    async fn clones_share_state() {
        let transport = MockTransport::new();
        let handle = transport.clone();

        transport
            .post_envelope("https://relay.test", &envelope())
            .await
            .unwrap();

        assert_eq!(handle.sent().len(), 1);

        handle.reset();
        assert!(transport.sent().is_empty());
    }
}
