//! Correlation identifiers for the provisioning relay.

use serde::{Deserialize, Serialize};
use std::fmt;

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Identifier correlating one request with its asynchronous response.
///
/// Format: `req_<unix-millis>_<9 base36 chars>`. The timestamp keeps ids
/// roughly sortable in relay logs; the random suffix makes a collision inside
/// a polling window vanishingly unlikely. Responses on the shared stream are
/// claimed by exact id equality, so uniqueness is the correctness mechanism,
/// not an optimization.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        let millis = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);

        let mut raw = [0u8; SUFFIX_LEN];
        getrandom::getrandom(&mut raw).expect("getrandom failed");
        let suffix: String = raw
            .iter()
            .map(|b| BASE36[*b as usize % BASE36.len()] as char)
            .collect();

        Self(format!("req_{millis}_{suffix}"))
    }

    /// Wrap an identifier received off the wire.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Whether a response's identifier belongs to this request.
    pub fn matches(&self, other: &str) -> bool {
        self.0 == other
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RequestId({})", self.0)
    }
}
