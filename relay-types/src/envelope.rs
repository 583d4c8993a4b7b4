//! Envelope - the wire format for requests and responses through the relay.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::{ProtocolError, RequestId};

/// HTTP-verb tag carried inside the request envelope.
///
/// The relay forwards the decrypted envelope to the file-server API using
/// this verb; on the tunnel itself everything travels as POST/GET.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    /// Read an existing resource.
    #[serde(rename = "GET")]
    Get,
    /// Create a resource.
    #[serde(rename = "POST")]
    Post,
    /// Update a resource.
    #[serde(rename = "PUT")]
    Put,
    /// Remove a resource.
    #[serde(rename = "DELETE")]
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        write!(f, "{verb}")
    }
}

/// Plaintext request envelope, one per outbound operation.
///
/// This is what gets encrypted; the tunnel only ever sees the ciphertext.
/// Immutable once sent - a retry after timeout means a new envelope with a
/// new id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Logical route on the file-server API (e.g. `/api/create-company`).
    pub endpoint: String,
    /// Verb the relay applies when forwarding.
    pub method: Method,
    /// Operation payload, opaque to the relay.
    pub payload: Value,
    /// Correlation id claimed back from the shared response stream.
    pub request_id: RequestId,
}

impl RequestEnvelope {
    /// Create an envelope with a freshly generated request id.
    pub fn new(endpoint: impl Into<String>, method: Method, payload: Value) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            payload,
            request_id: RequestId::generate(),
        }
    }

    /// Canonical JSON bytes - exactly what gets encrypted.
    pub fn to_json(&self) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(self).map_err(ProtocolError::Serialization)
    }

    /// Parse an envelope from canonical JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ProtocolError> {
        serde_json::from_slice(bytes).map_err(ProtocolError::Deserialization)
    }
}

/// Ciphertext wrapper as it travels over the tunnel.
///
/// Field names are the wire names both ends agree on: `data` and `iv`,
/// both base64. Never persisted; one per request envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    /// Base64 AES-256-CBC ciphertext.
    pub data: String,
    /// Base64 of the 16 random IV bytes drawn for this message.
    pub iv: String,
}

/// Decrypted response, correlated back to exactly one outstanding request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// Id of the request this response answers.
    pub request_id: RequestId,
    /// Whether the file-server operation succeeded.
    pub success: bool,
    /// Operation result (e.g. the api_key from create-company).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Human-readable detail, rendered by the caller on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ResponseEnvelope {
    /// Whether this response answers the given request.
    pub fn is_for(&self, id: &RequestId) -> bool {
        self.request_id == *id
    }

    /// Canonical JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(self).map_err(ProtocolError::Serialization)
    }

    /// Parse a response from decrypted JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ProtocolError> {
        serde_json::from_slice(bytes).map_err(ProtocolError::Deserialization)
    }
}

/// Body of one GET against the shared response endpoint.
///
/// Three shapes arrive here: the relay's own "still processing" marker, an
/// encrypted envelope addressed to somebody polling this stream, or anything
/// else. None of them is an error; an unrecognized body just means "keep
/// polling".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PollReply {
    /// Relay-side "still processing" marker. Distinct from the client's own
    /// poll budget, which is the only authoritative reason to give up.
    #[serde(default)]
    pub timeout: bool,
    /// Base64 ciphertext, when the body carries an encrypted envelope.
    #[serde(default)]
    pub data: Option<String>,
    /// Base64 IV, when the body carries an encrypted envelope.
    #[serde(default)]
    pub iv: Option<String>,
}

impl PollReply {
    /// Interpret a poll body, tolerating any shape.
    pub fn from_body(body: &Value) -> Self {
        serde_json::from_value(body.clone()).unwrap_or_default()
    }

    /// The encrypted payload, when both ciphertext and IV are present.
    pub fn encrypted(&self) -> Option<EncryptedEnvelope> {
        match (&self.data, &self.iv) {
            (Some(data), Some(iv)) => Some(EncryptedEnvelope {
                data: data.clone(),
                iv: iv.clone(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_envelope_json_roundtrip() {
        let envelope = RequestEnvelope::new(
            "/api/create-company",
            Method::Post,
            json!({"company_email": "ops@example.com", "quota_gb": 500}),
        );

        let bytes = envelope.to_json().unwrap();
        let restored = RequestEnvelope::from_json(&bytes).unwrap();

        assert_eq!(restored, envelope);
    }

    #[test]
    fn request_envelope_uses_wire_field_names() {
        let envelope = RequestEnvelope::new("/api/health", Method::Get, json!({}));
        let value: Value = serde_json::from_slice(&envelope.to_json().unwrap()).unwrap();

        assert_eq!(value["endpoint"], "/api/health");
        assert_eq!(value["method"], "GET");
        assert_eq!(value["payload"], json!({}));
        assert!(value["request_id"].as_str().unwrap().starts_with("req_"));
    }

    #[test]
    fn method_serializes_as_uppercase_verb() {
        assert_eq!(serde_json::to_string(&Method::Delete).unwrap(), "\"DELETE\"");
        assert_eq!(Method::Put.to_string(), "PUT");
    }

    #[test]
    fn response_envelope_optional_fields_default() {
        let response: ResponseEnvelope =
            serde_json::from_value(json!({"request_id": "req_1_a", "success": true})).unwrap();

        assert!(response.success);
        assert!(response.data.is_none());
        assert!(response.message.is_none());
    }

    #[test]
    fn response_correlation_by_id() {
        let id = RequestId::from_string("req_42_aaaaaaaaa");
        let response = ResponseEnvelope {
            request_id: RequestId::from_string("req_42_aaaaaaaaa"),
            success: false,
            data: None,
            message: Some("quota exceeded".into()),
        };

        assert!(response.is_for(&id));
        assert!(!response.is_for(&RequestId::from_string("req_42_bbbbbbbbb")));
    }

    #[test]
    fn poll_reply_recognizes_server_timeout_marker() {
        let reply = PollReply::from_body(&json!({"timeout": true}));
        assert!(reply.timeout);
        assert!(reply.encrypted().is_none());
    }

    #[test]
    fn poll_reply_extracts_encrypted_envelope() {
        let reply = PollReply::from_body(&json!({"data": "Y2lwaGVy", "iv": "aXY="}));
        let encrypted = reply.encrypted().unwrap();

        assert_eq!(encrypted.data, "Y2lwaGVy");
        assert_eq!(encrypted.iv, "aXY=");
    }

    #[test]
    fn poll_reply_tolerates_junk_bodies() {
        assert!(PollReply::from_body(&json!("not an object")).encrypted().is_none());
        assert!(PollReply::from_body(&json!({"data": "only-half"})).encrypted().is_none());
        assert!(!PollReply::from_body(&json!({})).timeout);
    }

    #[test]
    fn encrypted_envelope_wire_names() {
        let envelope = EncryptedEnvelope {
            data: "abc".into(),
            iv: "def".into(),
        };
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value, json!({"data": "abc", "iv": "def"}));
    }
}
