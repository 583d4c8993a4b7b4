//! Update a company's storage quota.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::RelayProfile;
use relay_client::UpdateQuota;

/// Run the update-quota command.
pub async fn run(data_dir: &Path, email: &str, api_key: &str, quota_gb: u64) -> Result<()> {
    let profile = RelayProfile::load(data_dir).await?;
    let provisioner = super::provisioner(&profile)?;

    let response = provisioner
        .update_quota(UpdateQuota {
            company_email: email.to_string(),
            api_key: api_key.to_string(),
            new_quota_gb: quota_gb,
        })
        .await
        .context("update-quota did not complete")?;

    super::print_response(&response)?;
    Ok(())
}
