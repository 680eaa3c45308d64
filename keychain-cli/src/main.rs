//! Developer CLI for the keychain profile store.
//!
//! Drives the same create / show / edit / delete flows as the mobile app,
//! storing the account in the OS credential store and the current account id
//! in a JSON preferences file.

mod commands;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use eyre::{eyre, Result};
use keychain_core::{
    AccessPolicy, FilePreferences, KeyringSecureStorage, ProfileManager, DEFAULT_SERVICE_NAME,
};
use tracing_subscriber::EnvFilter;

const PREFERENCES_FILENAME: &str = "preferences.json";

#[derive(Debug, Parser)]
#[command(name = "keychain-cli", version, about = "Manage the device account profile")]
struct Cli {
    /// Service name the account entry is stored under.
    #[arg(long, env = "KEYCHAIN_SERVICE", default_value = DEFAULT_SERVICE_NAME)]
    service: String,

    /// Access policy for the entry.
    #[arg(long, default_value_t = AccessPolicy::WhenUnlocked)]
    policy: AccessPolicy,

    /// Directory holding the preferences file.
    #[arg(long, env = "KEYCHAIN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the account and make it current.
    Create {
        /// Display name.
        #[arg(long)]
        name: Option<String>,
        /// Email address.
        #[arg(long)]
        email: String,
        /// Password.
        #[arg(long)]
        password: String,
        /// Password confirmation; defaults to `--password`.
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Show the current account.
    Show {
        /// Print the password instead of a mask.
        #[arg(long)]
        reveal: bool,
    },
    /// Edit the current account.
    Edit {
        /// New display name; an empty string clears it.
        #[arg(long)]
        name: Option<String>,
        /// New email address.
        #[arg(long)]
        email: Option<String>,
        /// New password.
        #[arg(long)]
        password: Option<String>,
        /// Password confirmation; defaults to the new password.
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Delete the current account.
    Delete,
}

fn data_dir(cli: &Cli) -> Result<PathBuf> {
    if let Some(dir) = &cli.data_dir {
        return Ok(dir.clone());
    }
    dirs::data_local_dir()
        .map(|dir| dir.join("keychain-cli"))
        .ok_or_else(|| eyre!("cannot determine a data directory; pass --data-dir"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let preferences_path = data_dir(&cli)?.join(PREFERENCES_FILENAME);
    tracing::debug!(
        service = %cli.service,
        policy = %cli.policy,
        preferences = %preferences_path.display(),
        "starting"
    );

    let manager = ProfileManager::with_options(
        Arc::new(KeyringSecureStorage::new()),
        Arc::new(FilePreferences::new(preferences_path)),
        cli.service,
        cli.policy,
    );

    let mut out = io::stdout().lock();
    match cli.command {
        Command::Create {
            name,
            email,
            password,
            confirm,
        } => commands::create(&manager, &mut out, name, email, password, confirm),
        Command::Show { reveal } => commands::show(&manager, &mut out, reveal),
        Command::Edit {
            name,
            email,
            password,
            confirm,
        } => commands::edit(&manager, &mut out, name, email, password, confirm),
        Command::Delete => commands::delete(&manager, &mut out),
    }
}
