//! # CLI module
//!
//! Provides the command-line interface:
//! - `init`: create the filesystem backend's directory layout and a notary identity
//! - `serve`: boot the repository and serve the HTTP semantics engine

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{init, run_command, serve, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
