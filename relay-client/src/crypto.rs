//! Envelope encryption for the provisioning relay.
//!
//! This module provides:
//! - AES-256-CBC encryption of request envelopes with PKCS#7 padding
//! - Fresh 16-byte random IVs per message
//! - [`EnvelopeKey`], the 32-byte pre-shared key both tunnel ends hold
//!
//! # Security Notes
//!
//! - The random per-message IV keeps ciphertexts unlinkable under the shared
//!   static key
//! - CBC carries no authentication tag; a padding failure is the routine
//!   signal that a polled payload belongs to another caller and must stay
//!   non-fatal in the poll loop
//! - Key material is zeroized on drop and redacted in Debug output

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::Value;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use relay_types::{EncryptedEnvelope, RequestEnvelope, ResponseEnvelope};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Key size for AES-256 (32 bytes).
pub const KEY_SIZE: usize = 32;

/// IV size for AES-CBC (one block, 16 bytes).
pub const IV_SIZE: usize = 16;

/// Crypto errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The pre-shared key has the wrong length.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// The IV is not one AES block after base64 decoding.
    #[error("invalid iv length: expected {expected}, got {actual}")]
    InvalidIvLength {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Ciphertext or IV is not valid base64.
    #[error("base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Padding check failed; the payload was not produced under this key/IV.
    #[error("decryption failed: invalid padding")]
    DecryptionFailed,

    /// Envelope JSON could not be produced or parsed.
    #[error("envelope encoding failed: {0}")]
    Encoding(#[source] serde_json::Error),
}

/// The pre-shared AES-256 key for the relay tunnel.
///
/// Both the client and the relay hold the same 32-byte secret; rotating it
/// means redeploying both ends together.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EnvelopeKey([u8; KEY_SIZE]);

impl EnvelopeKey {
    /// Build a key from the shared secret string, parsed as raw UTF-8 bytes.
    pub fn from_utf8(secret: &str) -> Result<Self, CryptoError> {
        let bytes = secret.as_bytes();
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Build a key from raw bytes.
    pub fn from_raw(key: [u8; KEY_SIZE]) -> Self {
        Self(key)
    }

    /// Generate a random key (for testing).
    pub fn random() -> Self {
        let mut key = [0u8; KEY_SIZE];
        getrandom::getrandom(&mut key).expect("getrandom failed");
        Self(key)
    }

    /// Encrypt a request envelope into its wire form.
    ///
    /// Serializes to canonical JSON, draws a fresh random IV and encrypts
    /// with AES-256-CBC/PKCS#7. Ciphertext and IV come back base64-encoded.
    pub fn seal(&self, request: &RequestEnvelope) -> Result<EncryptedEnvelope, CryptoError> {
        let plaintext = serde_json::to_vec(request).map_err(CryptoError::Encoding)?;
        Ok(self.seal_bytes(&plaintext))
    }

    /// Encrypt arbitrary JSON (relay-side tooling and tests).
    pub fn seal_json(&self, value: &Value) -> Result<EncryptedEnvelope, CryptoError> {
        let plaintext = serde_json::to_vec(value).map_err(CryptoError::Encoding)?;
        Ok(self.seal_bytes(&plaintext))
    }

    /// Decrypt a wire envelope into a response.
    pub fn open(&self, envelope: &EncryptedEnvelope) -> Result<ResponseEnvelope, CryptoError> {
        let plaintext = self.open_bytes(envelope)?;
        serde_json::from_slice(&plaintext).map_err(CryptoError::Encoding)
    }

    /// Decrypt a wire envelope into arbitrary JSON.
    pub fn open_json(&self, envelope: &EncryptedEnvelope) -> Result<Value, CryptoError> {
        let plaintext = self.open_bytes(envelope)?;
        serde_json::from_slice(&plaintext).map_err(CryptoError::Encoding)
    }

    fn seal_bytes(&self, plaintext: &[u8]) -> EncryptedEnvelope {
        let mut iv = [0u8; IV_SIZE];
        getrandom::getrandom(&mut iv).expect("getrandom failed");

        let ciphertext = Aes256CbcEnc::new(&self.0.into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        EncryptedEnvelope {
            data: STANDARD.encode(ciphertext),
            iv: STANDARD.encode(iv),
        }
    }

    fn open_bytes(&self, envelope: &EncryptedEnvelope) -> Result<Vec<u8>, CryptoError> {
        let ciphertext = STANDARD.decode(&envelope.data)?;
        let iv: [u8; IV_SIZE] = STANDARD
            .decode(&envelope.iv)?
            .try_into()
            .map_err(|bad: Vec<u8>| CryptoError::InvalidIvLength {
                expected: IV_SIZE,
                actual: bad.len(),
            })?;

        Aes256CbcDec::new(&self.0.into(), &iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| CryptoError::DecryptionFailed)
    }
}

// Don't leak the key in debug output
impl std::fmt::Debug for EnvelopeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EnvelopeKey([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_types::Method;
    use serde_json::json;

    // ===========================================
    // Round-trip Tests
    // ===========================================

    #[test]
    fn json_roundtrip() {
        let key = EnvelopeKey::random();
        let payload = json!({
            "request_id": "req_1700000000000_abc123xyz",
            "success": true,
            "data": {"api_key": "k-123", "nested": [1, 2, 3]},
        });

        let sealed = key.seal_json(&payload).unwrap();
        let opened = key.open_json(&sealed).unwrap();

        assert_eq!(opened, payload);
    }

    #[test]
    fn request_envelope_roundtrip() {
        let key = EnvelopeKey::random();
        let request = RequestEnvelope::new(
            "/api/add-user",
            Method::Post,
            json!({"username": "anna", "password": "hunter2"}),
        );

        let sealed = key.seal(&request).unwrap();
        let opened = key.open_json(&sealed).unwrap();

        assert_eq!(opened["endpoint"], "/api/add-user");
        assert_eq!(opened["method"], "POST");
        assert_eq!(opened["request_id"], request.request_id.as_str());
    }

    #[test]
    fn response_envelope_opens_typed() {
        let key = EnvelopeKey::random();
        let sealed = key
            .seal_json(&json!({"request_id": "req_5_aaaaaaaaa", "success": false, "message": "no such customer"}))
            .unwrap();

        let response = key.open(&sealed).unwrap();
        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("no such customer"));
    }

    #[test]
    fn empty_object_roundtrip() {
        let key = EnvelopeKey::random();
        let sealed = key.seal_json(&json!({})).unwrap();
        assert_eq!(key.open_json(&sealed).unwrap(), json!({}));
    }

    // ===========================================
    // IV Behavior
    // ===========================================

    #[test]
    fn fresh_iv_per_message() {
        let key = EnvelopeKey::random();
        let payload = json!({"same": "payload"});

        let first = key.seal_json(&payload).unwrap();
        let second = key.seal_json(&payload).unwrap();

        assert_ne!(first.iv, second.iv);
        assert_ne!(first.data, second.data);
        assert_eq!(key.open_json(&first).unwrap(), key.open_json(&second).unwrap());
    }

    #[test]
    fn iv_is_sixteen_bytes() {
        let key = EnvelopeKey::random();
        let sealed = key.seal_json(&json!({"x": 1})).unwrap();
        assert_eq!(STANDARD.decode(&sealed.iv).unwrap().len(), IV_SIZE);
    }

    // ===========================================
    // Failure Modes
    // ===========================================

    #[test]
    fn wrong_key_fails_decryption() {
        let sealed = EnvelopeKey::random().seal_json(&json!({"secret": true})).unwrap();
        let result = EnvelopeKey::random().open_json(&sealed);

        assert!(matches!(result, Err(CryptoError::DecryptionFailed) | Err(CryptoError::Encoding(_))));
    }

    #[test]
    fn corrupted_ciphertext_fails() {
        let key = EnvelopeKey::random();
        let mut sealed = key.seal_json(&json!({"x": "y"})).unwrap();

        let mut raw = STANDARD.decode(&sealed.data).unwrap();
        raw[0] ^= 0xFF;
        sealed.data = STANDARD.encode(raw);

        assert!(key.open_json(&sealed).is_err());
    }

    #[test]
    fn malformed_base64_fails() {
        let key = EnvelopeKey::random();
        let envelope = EncryptedEnvelope {
            data: "not@base64!".into(),
            iv: STANDARD.encode([0u8; IV_SIZE]),
        };
        assert!(matches!(key.open_json(&envelope), Err(CryptoError::Base64(_))));
    }

    #[test]
    fn short_iv_fails() {
        let key = EnvelopeKey::random();
        let sealed = key.seal_json(&json!({"x": 1})).unwrap();
        let envelope = EncryptedEnvelope {
            data: sealed.data,
            iv: STANDARD.encode([0u8; 8]),
        };

        assert!(matches!(
            key.open_json(&envelope),
            Err(CryptoError::InvalidIvLength { expected: 16, actual: 8 })
        ));
    }

    // ===========================================
    // Key Handling
    // ===========================================

    #[test]
    fn utf8_key_must_be_32_bytes() {
        assert!(EnvelopeKey::from_utf8("9__dHEdhjcXhhBlji2aGs1DZvn1p3v6t").is_ok());
        assert!(matches!(
            EnvelopeKey::from_utf8("too-short"),
            Err(CryptoError::InvalidKeyLength { expected: 32, actual: 9 })
        ));
    }

    #[test]
    fn both_ends_agree_on_utf8_key_parsing() {
        // The relay parses the configured key string as raw bytes; the client
        // must produce ciphertext the relay can open with that parsing.
        let secret = "0123456789abcdef0123456789abcdef";
        let client_key = EnvelopeKey::from_utf8(secret).unwrap();
        let mut raw = [0u8; KEY_SIZE];
        raw.copy_from_slice(secret.as_bytes());
        let relay_key = EnvelopeKey::from_raw(raw);

        let sealed = client_key.seal_json(&json!({"ping": true})).unwrap();
        assert_eq!(relay_key.open_json(&sealed).unwrap(), json!({"ping": true}));
    }

    #[test]
    fn debug_is_redacted() {
        let key = EnvelopeKey::random();
        assert!(format!("{key:?}").contains("REDACTED"));
    }
}
