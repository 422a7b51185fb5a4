//! Colored terminal output helpers.
//!
//! All user-facing status output goes through these functions so we
//! get consistent styling across every command.  Secret values are
//! printed raw by `get`, never through here.

use console::style;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print secret names, one per line.
pub fn print_names(names: &[String]) {
    if names.is_empty() {
        info("No secrets in this vault yet.");
        tip("Run `secret set <NAME> <VALUE>` to add your first secret.");
        return;
    }

    for name in names {
        println!("{name}");
    }
}
