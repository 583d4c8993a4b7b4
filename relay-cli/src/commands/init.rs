//! Store the relay profile.

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::config::RelayProfile;
use relay_client::KEY_SIZE;

/// Run the init command.
pub async fn run(data_dir: &Path, url: &str, fallbacks: &[String], key: Option<&str>) -> Result<()> {
    let key = match key {
        Some(k) => k.to_string(),
        None => rpassword::prompt_password("Envelope key (32 characters): ")
            .context("Failed to read envelope key")?,
    };

    if key.len() != KEY_SIZE {
        bail!(
            "envelope key must be exactly {KEY_SIZE} bytes, got {}",
            key.len()
        );
    }

    let mut relay_urls = vec![url.to_string()];
    relay_urls.extend(fallbacks.iter().cloned());

    let profile = RelayProfile::new(relay_urls, key);
    profile.save(data_dir).await?;

    println!("Relay profile saved.");
    println!("  Primary:  {url}");
    for fallback in fallbacks {
        println!("  Fallback: {fallback}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn init_writes_the_profile() {
        let dir = tempdir().unwrap();
        let fallbacks = vec!["https://tunnel.test".to_string()];

        run(
            dir.path(),
            "https://relay.test",
            &fallbacks,
            Some("0123456789abcdef0123456789abcdef"),
        )
        .await
        .unwrap();

        let profile = RelayProfile::load(dir.path()).await.unwrap();
        assert_eq!(
            profile.relay_urls,
            vec!["https://relay.test", "https://tunnel.test"]
        );
    }

    #[tokio::test]
    async fn init_rejects_wrong_key_length() {
        let dir = tempdir().unwrap();
        let result = run(dir.path(), "https://relay.test", &[], Some("short")).await;

        assert!(result.is_err());
        assert!(!RelayProfile::exists(dir.path()).await);
    }
}
