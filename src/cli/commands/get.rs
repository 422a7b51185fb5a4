//! `secret get`: retrieve and print a single secret's value.

use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `get` command.
pub fn execute(cli: &Cli, name: &str) -> Result<()> {
    let vault = open_vault(cli)?;

    // Decrypt and print the secret value to stdout.
    let value = vault.get(name)?;
    println!("{value}");

    Ok(())
}
