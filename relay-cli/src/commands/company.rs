//! Provision a company account.

use anyhow::{Context, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::path::Path;

use crate::config::RelayProfile;
use relay_client::CreateCompany;

/// Run the create-company command.
pub async fn create(
    data_dir: &Path,
    email: &str,
    quota_gb: u64,
    admin_password: Option<String>,
) -> Result<()> {
    let profile = RelayProfile::load(data_dir).await?;
    let provisioner = super::provisioner(&profile)?;

    let (password, generated) = match admin_password {
        Some(p) => (p, false),
        None => (generate_password(), true),
    };

    let response = provisioner
        .create_company(CreateCompany {
            company_email: email.to_string(),
            quota_gb,
            admin_password: password.clone(),
        })
        .await
        .context("create-company did not complete")?;

    super::print_response(&response)?;

    if generated && response.success {
        println!();
        println!("Generated admin password: {password}");
        println!("Store it now; it is not persisted anywhere.");
    }
    Ok(())
}

/// Generate a 24-character alphanumeric admin password.
fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_passwords_are_long_and_distinct() {
        let first = generate_password();
        let second = generate_password();

        assert_eq!(first.len(), 24);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first, second);
    }
}
