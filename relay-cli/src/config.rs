//! Configuration management for relay-cli.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Relay profile stored locally: endpoints plus the shared envelope key.
#[derive(Clone, Serialize, Deserialize)]
pub struct RelayProfile {
    /// Ordered relay base URLs, primary first.
    pub relay_urls: Vec<String>,
    /// The 32-byte shared envelope key.
    pub encryption_key: String,
    /// When the profile was created (unix seconds).
    pub created_at: u64,
}

impl RelayProfile {
    /// Create a new profile.
    pub fn new(relay_urls: Vec<String>, encryption_key: String) -> Self {
        Self {
            relay_urls,
            encryption_key,
            created_at: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    /// Load the profile from a data directory.
    pub async fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join("relay.json");
        let contents = tokio::fs::read_to_string(&path)
            .await
            .context("Relay profile not found. Run 'relay-cli init' first.")?;
        serde_json::from_str(&contents).context("Invalid relay profile")
    }

    /// Save the profile to a data directory, owner-readable only.
    pub async fn save(&self, data_dir: &Path) -> Result<()> {
        let path = data_dir.join("relay.json");
        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(&path, contents)
            .await
            .context("Failed to save relay profile")?;
        set_file_permissions_0600(&path).await?;
        Ok(())
    }

    /// Check if a profile exists.
    pub async fn exists(data_dir: &Path) -> bool {
        data_dir.join("relay.json").exists()
    }

    /// Resolve the envelope key: the environment variable wins over the
    /// stored profile, so operators can rotate without rewriting the file.
    pub fn resolve_key(&self) -> String {
        std::env::var("GREENHOST_RELAY_KEY").unwrap_or_else(|_| self.encryption_key.clone())
    }
}

// Don't leak the key in debug output
impl std::fmt::Debug for RelayProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayProfile")
            .field("relay_urls", &self.relay_urls)
            .field("encryption_key", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Set file permissions to 0600 (owner read/write only) on Unix.
/// No-op on non-Unix platforms.
async fn set_file_permissions_0600(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .await
            .context("Failed to set file permissions")?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

/// Set directory permissions to 0700 (owner only) on Unix.
/// No-op on non-Unix platforms.
pub async fn set_dir_permissions_0700(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
            .await
            .context("Failed to set directory permissions")?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}
