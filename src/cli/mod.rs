//! CLI module: clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{SecretError, Result};
use crate::vault::Vault;

/// secret: a passphrase-encrypted key-value store.
#[derive(Parser)]
#[command(name = "secret", about = "Passphrase-encrypted secret store", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Passphrase used to encrypt the vault (prompted if omitted)
    #[arg(short, long, env = "SECRET_KEY", hide_env_values = true, global = true)]
    pub key: Option<String>,

    /// Vault file (default: ~/.secrets, or `secrets_file` in ~/.secret.toml)
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Set a secret (add or update)
    Set {
        /// Secret name (e.g. twitter_api_key)
        name: String,
        /// Secret value (omit to read stdin or prompt)
        value: Option<String>,
    },

    /// Print a secret's value
    Get {
        /// Secret name
        name: String,
    },

    /// Remove a secret
    Remove {
        /// Secret name
        name: String,
    },

    /// List secret names
    List,
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get the vault passphrase, trying in order:
/// 1. `--key` / `SECRET_KEY`
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the passphrase is wiped from memory on drop.
pub fn passphrase(cli: &Cli) -> Result<Zeroizing<String>> {
    if let Some(key) = &cli.key {
        return Ok(Zeroizing::new(key.clone()));
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter vault passphrase")
        .allow_empty_password(true)
        .interact()
        .map_err(|e| SecretError::CommandFailed(format!("passphrase prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Resolve the vault file: `--file`, else the configured or default
/// path under the home directory.
pub fn secrets_path(cli: &Cli) -> Result<PathBuf> {
    if let Some(path) = &cli.file {
        return Ok(path.clone());
    }

    let home = dirs::home_dir()
        .ok_or_else(|| SecretError::Config("cannot determine home directory".into()))?;
    let settings = Settings::load(&home)?;
    Ok(settings.secrets_path(&home))
}

/// Open the vault addressed by the CLI arguments.
pub fn open_vault(cli: &Cli) -> Result<Vault> {
    let path = secrets_path(cli)?;
    let passphrase = passphrase(cli)?;
    Ok(Vault::new(&passphrase, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_set_with_inline_value() {
        let cli = Cli::try_parse_from(["secret", "-k", "pw", "set", "api", "123"]).unwrap();
        assert_eq!(cli.key.as_deref(), Some("pw"));
        assert!(matches!(
            cli.command,
            Commands::Set { ref name, value: Some(ref v) } if name == "api" && v == "123"
        ));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["secret", "get", "api", "--file", "/tmp/vault", "--key", "pw"])
                .unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("/tmp/vault")));
        assert!(matches!(cli.command, Commands::Get { ref name } if name == "api"));
    }

    #[test]
    fn remove_requires_a_name() {
        assert!(Cli::try_parse_from(["secret", "remove"]).is_err());
    }

    #[test]
    fn explicit_file_wins() {
        let cli = Cli::try_parse_from(["secret", "list", "-f", "custom.secrets"]).unwrap();
        assert_eq!(secrets_path(&cli).unwrap(), PathBuf::from("custom.secrets"));
    }
}
