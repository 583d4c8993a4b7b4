//! Fetch a customer's account and usage details.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::RelayProfile;

/// Run the get-customer command.
pub async fn run(data_dir: &Path, email: &str, api_key: &str) -> Result<()> {
    let profile = RelayProfile::load(data_dir).await?;
    let provisioner = super::provisioner(&profile)?;

    let response = provisioner
        .get_customer(email, api_key)
        .await
        .context("get-customer did not complete")?;

    super::print_response(&response)?;
    Ok(())
}
