//! `secret list`: print the names of all stored secrets.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let vault = open_vault(cli)?;
    output::print_names(&vault.names()?);
    Ok(())
}
