use std::io::{self, IsTerminal};

use clap::Parser;
use otp_secrets::cli::{self, Args};
use tracing_subscriber::EnvFilter;

pub fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr so stdout only ever carries codes and labels
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let args = Args::parse();
    let mode = args.mode().unwrap_or_else(|e| e.exit());

    let stdout = io::stdout();
    let interactive = stdout.is_terminal();

    cli::run(&args, &mode, &mut stdout.lock(), &mut io::stderr(), interactive)?;

    Ok(())
}
