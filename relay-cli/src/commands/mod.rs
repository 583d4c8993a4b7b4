//! CLI command implementations.

pub mod company;
pub mod customer;
pub mod health;
pub mod init;
pub mod quota;
pub mod status;
pub mod user;

use anyhow::{Context, Result};
use relay_client::{EnvelopeKey, HttpTransport, RelayClient, RelayConfig, StorageProvisioner};
use relay_types::ResponseEnvelope;

use crate::config::RelayProfile;

/// Build a provisioner from a stored profile.
pub(crate) fn provisioner(profile: &RelayProfile) -> Result<StorageProvisioner<HttpTransport>> {
    let key = EnvelopeKey::from_utf8(&profile.resolve_key())
        .context("Invalid envelope key: must be exactly 32 bytes")?;
    let config = RelayConfig::new(key, profile.relay_urls.clone());
    Ok(StorageProvisioner::new(RelayClient::new(
        config,
        HttpTransport::new(),
    )))
}

/// Print a decrypted relay response for the operator.
pub(crate) fn print_response(response: &ResponseEnvelope) -> Result<()> {
    println!("Success: {}", response.success);
    if let Some(message) = &response.message {
        println!("Message: {message}");
    }
    if let Some(data) = &response.data {
        println!("Data:");
        println!("{}", serde_json::to_string_pretty(data)?);
    }
    Ok(())
}
