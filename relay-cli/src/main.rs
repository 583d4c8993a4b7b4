//! # relay-cli
//!
//! Operator CLI for the GreenHost provisioning relay.
//!
//! ## Commands
//!
//! - `init`: store relay endpoints and the shared envelope key
//! - `status`: probe the relay status endpoint (unencrypted)
//! - `health`: end-to-end health check through the encrypted channel
//! - `create-company`: provision a company account on the file server
//! - `add-user` / `delete-user`: manage company sub-users
//! - `update-quota`: change a company's storage quota
//! - `get-customer`: fetch account and usage details
//!
//! ## Example
//!
//! ```bash
//! # Store endpoints and key (prompts for the key)
//! relay-cli init --url https://relay.greenhost.cloud \
//!     --fallback https://tunnel.greenhost.cloud
//!
//! # Is the tunnel up?
//! relay-cli status
//!
//! # Provision a customer
//! relay-cli create-company --email ops@example.com --quota-gb 500
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;

use commands::{company, customer, health, init, quota, status, user};

/// Operator CLI for the GreenHost provisioning relay.
#[derive(Parser, Debug)]
#[command(name = "relay-cli")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory holding the stored relay profile
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store relay endpoints and the shared envelope key
    Init {
        /// Primary relay base URL
        #[arg(long)]
        url: String,

        /// Fallback relay base URL(s), tried in order after the primary
        #[arg(long)]
        fallback: Vec<String>,

        /// Shared 32-character envelope key (prompted when omitted)
        #[arg(long)]
        key: Option<String>,
    },

    /// Probe the relay status endpoint
    Status,

    /// Health check through the encrypted channel
    Health,

    /// Provision a company account
    CreateCompany {
        /// Company billing email
        #[arg(long)]
        email: String,

        /// Storage quota in gigabytes
        #[arg(long)]
        quota_gb: u64,

        /// Admin password for the account (generated when omitted)
        #[arg(long)]
        admin_password: Option<String>,
    },

    /// Add a sub-user to a company account
    AddUser {
        /// Company billing email
        #[arg(long)]
        email: String,

        /// Company api key from create-company
        #[arg(long)]
        api_key: String,

        /// Login name for the new user
        #[arg(long)]
        username: String,

        /// Password for the new user (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Remove a sub-user from a company account
    DeleteUser {
        /// Company billing email
        #[arg(long)]
        email: String,

        /// Company api key
        #[arg(long)]
        api_key: String,

        /// Login name of the user to remove
        #[arg(long)]
        username: String,
    },

    /// Update a company's storage quota
    UpdateQuota {
        /// Company billing email
        #[arg(long)]
        email: String,

        /// Company api key
        #[arg(long)]
        api_key: String,

        /// New quota in gigabytes
        #[arg(long)]
        quota_gb: u64,
    },

    /// Fetch a customer's account and usage details
    GetCustomer {
        /// Company billing email
        #[arg(long)]
        email: String,

        /// Company api key
        #[arg(long)]
        api_key: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };
    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;
    config::set_dir_permissions_0700(&data_dir).await?;

    match cli.command {
        Commands::Init { url, fallback, key } => {
            init::run(&data_dir, &url, &fallback, key.as_deref()).await?;
        }
        Commands::Status => {
            status::run(&data_dir).await?;
        }
        Commands::Health => {
            health::run(&data_dir).await?;
        }
        Commands::CreateCompany {
            email,
            quota_gb,
            admin_password,
        } => {
            company::create(&data_dir, &email, quota_gb, admin_password).await?;
        }
        Commands::AddUser {
            email,
            api_key,
            username,
            password,
        } => {
            user::add(&data_dir, &email, &api_key, &username, password).await?;
        }
        Commands::DeleteUser {
            email,
            api_key,
            username,
        } => {
            user::delete(&data_dir, &email, &api_key, &username).await?;
        }
        Commands::UpdateQuota {
            email,
            api_key,
            quota_gb,
        } => {
            quota::run(&data_dir, &email, &api_key, quota_gb).await?;
        }
        Commands::GetCustomer { email, api_key } => {
            customer::run(&data_dir, &email, &api_key).await?;
        }
    }

    Ok(())
}

/// Get the default data directory for relay-cli.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("cloud", "greenhost", "relay-cli")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
