//! `secret set`: add or update a secret in the vault.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::{SecretError, Result};

/// Execute the `set` command.
pub fn execute(cli: &Cli, name: &str, value: Option<&str>) -> Result<()> {
    // Determine the secret value from one of three sources.
    let secret_value = if let Some(v) = value {
        // Source 1: Inline value on the command line.
        Zeroizing::new(v.to_string())
    } else if !io::stdin().is_terminal() {
        // Source 2: Piped input (stdin is not a terminal).
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed_len = buf.trim_end().len();
        buf.truncate(trimmed_len);
        buf
    } else {
        // Source 3: Interactive secure prompt.
        let v = dialoguer::Password::new()
            .with_prompt(format!("Enter value for {name}"))
            .interact()
            .map_err(|e| SecretError::CommandFailed(format!("input prompt: {e}")))?;
        Zeroizing::new(v)
    };

    let vault = open_vault(cli)?;
    vault.set(name, &secret_value)?;

    output::success(&format!("Secret '{name}' saved to {}", vault.path().display()));
    Ok(())
}
