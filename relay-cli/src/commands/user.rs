//! Manage company sub-users.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::RelayProfile;
use relay_client::{AddUser, DeleteUser};

/// Run the add-user command.
pub async fn add(
    data_dir: &Path,
    email: &str,
    api_key: &str,
    username: &str,
    password: Option<String>,
) -> Result<()> {
    let profile = RelayProfile::load(data_dir).await?;
    let provisioner = super::provisioner(&profile)?;

    let password = match password {
        Some(p) => p,
        None => rpassword::prompt_password(format!("Password for {username}: "))
            .context("Failed to read password")?,
    };

    let response = provisioner
        .add_user(AddUser {
            company_email: email.to_string(),
            api_key: api_key.to_string(),
            username: username.to_string(),
            password,
        })
        .await
        .context("add-user did not complete")?;

    super::print_response(&response)?;
    Ok(())
}

/// Run the delete-user command.
pub async fn delete(data_dir: &Path, email: &str, api_key: &str, username: &str) -> Result<()> {
    let profile = RelayProfile::load(data_dir).await?;
    let provisioner = super::provisioner(&profile)?;

    let response = provisioner
        .delete_user(DeleteUser {
            company_email: email.to_string(),
            api_key: api_key.to_string(),
            username: username.to_string(),
        })
        .await
        .context("delete-user did not complete")?;

    super::print_response(&response)?;
    Ok(())
}
