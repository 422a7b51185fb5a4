use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::{SecretError, Result};

/// User-level configuration, loaded from `~/.secret.toml`.
///
/// Every field has a sensible default so the tool works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Vault file.  Relative paths resolve against the home directory.
    #[serde(default = "default_secrets_file")]
    pub secrets_file: PathBuf,
}

fn default_secrets_file() -> PathBuf {
    PathBuf::from(".secrets")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            secrets_file: default_secrets_file(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the home directory.
    const FILE_NAME: &'static str = ".secret.toml";

    /// Load settings from `<home>/.secret.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(home: &Path) -> Result<Self> {
        let config_path = home.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        toml::from_str(&contents).map_err(|e| {
            SecretError::Config(format!("Failed to parse {}: {e}", config_path.display()))
        })
    }

    /// Full path to the vault file.
    pub fn secrets_path(&self, home: &Path) -> PathBuf {
        home.join(&self.secrets_file)
    }
}
