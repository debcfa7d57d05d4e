//! # Completions Command Implementation
//!
//! Generates shell completion scripts via `clap_complete`, which ships its
//! own `ValueEnum` over the supported shells. Output goes to stdout; users
//! redirect it into the completion directory for their shell.
//!
//! ```bash
//! remote-sync completions bash > ~/.local/share/bash-completion/completions/remote-sync
//! remote-sync completions zsh > ~/.zfunc/_remote-sync
//! ```

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::io;

use crate::cli::Cli;

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Execute the `completions` command.
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, "remote-sync", &mut io::stdout());
    Ok(())
}
