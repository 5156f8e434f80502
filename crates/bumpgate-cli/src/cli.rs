//! Command-line arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Decide which dependency updates may be proposed
#[derive(Parser, Debug)]
#[command(name = "bumpgate", version, about)]
pub(crate) struct CliArgs {
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    /// Print the version ranges excluded for a dependency as a JSON array
    Ignored {
        /// Update configuration file (JSON)
        #[arg(long)]
        config: PathBuf,

        /// Dependency name to look up
        #[arg(long)]
        dependency: String,

        /// Currently resolved version, used for update-type rules
        #[arg(long)]
        current_version: Option<String>,
    },

    /// Print the resolved packages that block a target version as a JSON array
    Conflicts {
        /// package-lock.json, npm-shrinkwrap.json, or yarn.lock
        #[arg(long)]
        lockfile: PathBuf,

        /// Dependency being updated
        #[arg(long)]
        dependency: String,

        /// Candidate version
        #[arg(long)]
        target_version: String,
    },
}
