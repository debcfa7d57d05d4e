//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;

use crate::commands;
use remote_sync::output::OutputConfig;

/// Remote Sync - Track and verify files copied from remote repositories
#[derive(Parser, Debug)]
#[command(name = "remote-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show a summary of the tracked state and its consistency
    Status(commands::status::StatusArgs),

    /// Verify every tracked file against the recorded state
    Validate(commands::validate::ValidateArgs),

    /// Delete managed files the state no longer references
    Clean(commands::clean::CleanArgs),

    /// Wipe the persisted state record
    Reset(commands::reset::ResetArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        env_logger::Builder::from_env(Env::default().default_filter_or(self.log_level.as_str()))
            .format_timestamp(None)
            .init();
        let output = OutputConfig::from_env_and_flag(&self.color);

        match self.command {
            Commands::Status(args) => commands::status::execute(args),
            Commands::Validate(args) => commands::validate::execute(args),
            Commands::Clean(args) => commands::clean::execute(args, &output),
            Commands::Reset(args) => commands::reset::execute(args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}
