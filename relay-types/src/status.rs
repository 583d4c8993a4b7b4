//! Status payloads from the relay's unauthenticated health endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Health payload reported by a relay host.
///
/// Ephemeral: fetched on demand for the dashboard, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    /// Whether the relay can reach the file server.
    pub online: bool,
    /// Requests waiting in the relay's forwarding queue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_size: Option<u64>,
    /// Optional operator-facing note from the relay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ServerStatus {
    /// Parse a status body, unwrapping one level of `status` nesting.
    ///
    /// Some relay builds wrap the payload as `{"status": {...}}`, others
    /// return it flat; both are accepted. Returns `None` when neither form
    /// parses.
    pub fn from_body(body: &Value) -> Option<Self> {
        let inner = match body.get("status") {
            Some(nested) if nested.is_object() => nested,
            _ => body,
        };
        serde_json::from_value(inner.clone()).ok()
    }
}
