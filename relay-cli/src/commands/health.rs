//! End-to-end health check through the encrypted channel.
//!
//! Unlike `status`, this exercises the full path: encryption, the relay's
//! forwarding queue, the file-server API, and the polled response stream.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::RelayProfile;

/// Run the health command.
pub async fn run(data_dir: &Path) -> Result<()> {
    let profile = RelayProfile::load(data_dir).await?;
    let provisioner = super::provisioner(&profile)?;

    let response = provisioner
        .health_check()
        .await
        .context("Health check did not complete")?;

    super::print_response(&response)?;
    Ok(())
}
