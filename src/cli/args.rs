//! # CLI argument definitions
//!
//! Commands:
//! - `nebula-repository init --config <path>`
//! - `nebula-repository serve --config <path>`

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// nebula-repository - a content-addressed document repository for the Bali Nebula
#[derive(Parser, Debug)]
#[command(name = "nebula-repository")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a new data directory: creates the filesystem backend's
    /// subdirectories and, if none exists yet, generates a notary identity.
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./nebula.json")]
        config: PathBuf,
    },

    /// Start the HTTP semantics engine, serving the repository over the
    /// configured socket.
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./nebula.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
