//! # relay-client
//!
//! Client library for the GreenHost provisioning relay protocol.
//!
//! The SFTPGo cluster hosting customer storage is not directly
//! internet-reachable; provisioning commands travel as encrypted envelopes
//! through an HTTP tunnel relay and results come back on a shared, polled
//! response stream. This crate implements the client side:
//!
//! - **Envelope encryption**: AES-256-CBC with a random 16-byte IV per
//!   message under a pre-shared key
//! - **Asynchronous correlation**: request-id filtering over the shared
//!   response endpoint
//! - **Failover**: ordered relay base URLs, fallback on send failure
//! - **Typed operations**: company/user provisioning, quota, customer
//!   lookup, health and status
//!
//! ## Example
//!
//! ```ignore
//! use relay_client::{EnvelopeKey, HttpTransport, RelayClient, RelayConfig, StorageProvisioner};
//!
//! let key = EnvelopeKey::from_utf8(&std::env::var("GREENHOST_RELAY_KEY")?)?;
//! let config = RelayConfig::new(
//!     key,
//!     vec![
//!         "https://relay.greenhost.cloud".into(),
//!         "https://tunnel.greenhost.cloud".into(),
//!     ],
//! );
//! let provisioner = StorageProvisioner::new(RelayClient::new(config, HttpTransport::new()));
//!
//! let report = provisioner.check_status().await;
//! println!("{}: {}", report.status, report.message);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod crypto;
pub mod provision;
pub mod status;
pub mod transport;

pub use client::{ClientError, RelayClient, RelayConfig, SECURE_PATH, STATUS_PATH};
pub use crypto::{CryptoError, EnvelopeKey, IV_SIZE, KEY_SIZE};
pub use provision::{AddUser, CreateCompany, DeleteUser, StorageProvisioner, UpdateQuota};
pub use status::{ServiceStatus, StatusReport};
pub use transport::{HttpTransport, MockTransport, Transport, TransportError};
