//! Command-line interface, parsed with clap.

use clap::{Parser, Subcommand};

/// Jobsweep - garbage collection for the scraped job cache
#[derive(Parser)]
#[command(name = "jobsweep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Serve the cleanup endpoint, plus the cron schedule when enabled
    #[command(alias = "daemon")]
    Serve,

    /// Run one sweep and print its summary as JSON
    Sweep {
        /// Pretty-print the summary
        #[arg(long)]
        pretty: bool,
    },

    /// Apply pending schema migrations and exit
    Migrate,
}

impl Cli {
    #[must_use]
    pub fn command(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Serve)
    }
}
