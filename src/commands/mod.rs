//! # CLI Command Implementations
//!
//! Implementation of each `remote-sync` subcommand, one file per command.
//! Each module defines an `Args` struct (derived with `clap`) and an
//! `execute` function that drives the `remote_sync` library. The binary
//! stays a thin wrapper; all state logic lives in the library.

pub mod clean;
pub mod completions;
pub mod reset;
pub mod status;
pub mod validate;
