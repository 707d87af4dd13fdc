//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod init;
mod job;

pub use job::JobCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Job management
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Scaffold a new job directory
    Init {
        /// Directory to create the job in
        #[arg(default_value = ".")]
        dir: String,

        /// Job name written to config.json (defaults to the directory name)
        #[arg(long)]
        name: Option<String>,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Job { command } => job::handle_job_command(command, config).await,
        Commands::Init { dir, name, force } => init::scaffold_job(&dir, name, force).await,
    }
}
