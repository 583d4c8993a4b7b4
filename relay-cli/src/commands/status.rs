//! Probe the relay status endpoint.

use anyhow::Result;
use std::path::Path;

use crate::config::RelayProfile;

/// Run the status command.
pub async fn run(data_dir: &Path) -> Result<()> {
    let profile = RelayProfile::load(data_dir).await?;
    let provisioner = super::provisioner(&profile)?;

    println!("=== relay status ===");
    println!();
    println!("Endpoints:");
    for (i, url) in profile.relay_urls.iter().enumerate() {
        let label = if i == 0 { "primary " } else { "fallback" };
        println!("  [{label}] {url}");
    }

    let report = provisioner.check_status().await;

    println!();
    println!("Status:  {}", report.status);
    println!("Message: {}", report.message);
    Ok(())
}
