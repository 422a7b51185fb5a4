use clap::Parser;
use secretvault::cli::{output, Cli, Commands};

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Set {
            ref name,
            ref value,
        } => secretvault::cli::commands::set::execute(&cli, name, value.as_deref()),
        Commands::Get { ref name } => secretvault::cli::commands::get::execute(&cli, name),
        Commands::Remove { ref name } => secretvault::cli::commands::remove::execute(&cli, name),
        Commands::List => secretvault::cli::commands::list::execute(&cli),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Diagnostics go to stderr, filtered by `SECRET_LOG` (default: warn).
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("SECRET_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
