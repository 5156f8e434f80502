//! bumpgate command-line front end.
//!
//! Results are printed to stdout as JSON; logs go to stderr and are
//! controlled with `RUST_LOG`.

mod cli;
mod commands;

use clap::Parser;
use cli::{CliArgs, Command};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    let output = match &args.command {
        Command::Ignored {
            config,
            dependency,
            current_version,
        } => commands::ignored(config, dependency, current_version.as_deref()).await,
        Command::Conflicts {
            lockfile,
            dependency,
            target_version,
        } => commands::conflicts(lockfile, dependency, target_version).await,
    };

    match output {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
